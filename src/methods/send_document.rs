use super::base::{Request, TelegramMethod};

use crate::{
    client::Bot,
    types::{Message, ReplyMarkup},
};

use serde::Serialize;
use serde_with::skip_serializing_none;

/// Use this method to send general files.
/// # Documentation
/// <https://core.telegram.org/bots/api#senddocument>
/// # Returns
/// On success, the sent [`Message`] is returned
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendDocument {
    /// Unique identifier for the target chat
    pub chat_id: i64,
    /// File to send. Pass an HTTP URL for Telegram to get a file from the Internet
    pub document: String,
    /// Document caption, 0-1024 characters after entities parsing
    pub caption: Option<String>,
    /// Mode for parsing entities in the document caption
    pub parse_mode: Option<String>,
    /// If the message is a reply, ID of the original message
    pub reply_to_message_id: Option<i64>,
    /// Additional interface options
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendDocument {
    #[must_use]
    pub fn new(chat_id: i64, document: impl Into<String>) -> Self {
        Self {
            chat_id,
            document: document.into(),
            caption: None,
            parse_mode: None,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }

    #[must_use]
    pub fn parse_mode(self, val: impl Into<String>) -> Self {
        Self {
            parse_mode: Some(val.into()),
            ..self
        }
    }

    #[must_use]
    pub fn caption_option(self, val: Option<impl Into<String>>) -> Self {
        Self {
            caption: val.map(Into::into),
            ..self
        }
    }

    #[must_use]
    pub fn reply_to_message_id_option(self, val: Option<i64>) -> Self {
        Self {
            reply_to_message_id: val,
            ..self
        }
    }

    #[must_use]
    pub fn reply_markup_option(self, val: Option<impl Into<ReplyMarkup>>) -> Self {
        Self {
            reply_markup: val.map(Into::into),
            ..self
        }
    }
}

impl TelegramMethod for SendDocument {
    type Method = Self;
    type Return = Message;

    fn build_request<Client>(&self, _bot: &Bot<Client>) -> Request<'_, Self::Method> {
        Request::new("sendDocument", self)
    }
}

impl AsRef<SendDocument> for SendDocument {
    fn as_ref(&self) -> &Self {
        self
    }
}
