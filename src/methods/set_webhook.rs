use super::base::{Request, TelegramMethod};

use crate::client::Bot;

use serde::Serialize;
use serde_with::skip_serializing_none;

/// Use this method to specify a URL and receive incoming updates via an outgoing webhook.
/// Whenever there is an update for the bot, we will send an HTTPS POST request to the specified URL.
/// # Documentation
/// <https://core.telegram.org/bots/api#setwebhook>
/// # Returns
/// Returns `true` on success
#[skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SetWebhook {
    /// HTTPS URL to send updates to
    pub url: String,
    /// A list of the update types you want your bot to receive
    pub allowed_updates: Option<Vec<String>>,
    /// Pass `true` to drop all pending updates
    pub drop_pending_updates: Option<bool>,
    /// A secret token to be sent in a header `X-Telegram-Bot-Api-Secret-Token` in every webhook request, 1-256 characters
    pub secret_token: Option<String>,
}

impl SetWebhook {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            allowed_updates: None,
            drop_pending_updates: None,
            secret_token: None,
        }
    }

    #[must_use]
    pub fn allowed_updates<T, I>(self, val: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = T>,
    {
        Self {
            allowed_updates: Some(val.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    #[must_use]
    pub fn drop_pending_updates(self, val: bool) -> Self {
        Self {
            drop_pending_updates: Some(val),
            ..self
        }
    }

    #[must_use]
    pub fn secret_token(self, val: impl Into<String>) -> Self {
        Self {
            secret_token: Some(val.into()),
            ..self
        }
    }
}

impl TelegramMethod for SetWebhook {
    type Method = Self;
    type Return = bool;

    fn build_request<Client>(&self, _bot: &Bot<Client>) -> Request<'_, Self::Method> {
        Request::new("setWebhook", self)
    }
}

impl AsRef<SetWebhook> for SetWebhook {
    fn as_ref(&self) -> &Self {
        self
    }
}
