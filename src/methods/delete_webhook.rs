use super::base::{Request, TelegramMethod};

use crate::client::Bot;

use serde::Serialize;
use serde_with::skip_serializing_none;

/// Use this method to remove webhook integration if you decide to switch back to [`GetUpdates`](https://core.telegram.org/bots/api#getupdates).
/// # Documentation
/// <https://core.telegram.org/bots/api#deletewebhook>
/// # Returns
/// Returns `true` on success
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, Serialize)]
pub struct DeleteWebhook {
    /// Pass `true` to drop all pending updates
    pub drop_pending_updates: Option<bool>,
}

impl DeleteWebhook {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drop_pending_updates: None,
        }
    }

    #[must_use]
    pub fn drop_pending_updates(self, val: bool) -> Self {
        Self {
            drop_pending_updates: Some(val),
        }
    }
}

impl TelegramMethod for DeleteWebhook {
    type Method = Self;
    type Return = bool;

    fn build_request<Client>(&self, _bot: &Bot<Client>) -> Request<'_, Self::Method> {
        Request::new("deleteWebhook", self)
    }
}

impl AsRef<DeleteWebhook> for DeleteWebhook {
    fn as_ref(&self) -> &Self {
        self
    }
}
