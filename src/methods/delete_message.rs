use super::base::{Request, TelegramMethod};

use crate::client::Bot;

use serde::Serialize;

/// Use this method to delete a message, including service messages.
/// # Documentation
/// <https://core.telegram.org/bots/api#deletemessage>
/// # Returns
/// Returns `true` on success
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, Serialize)]
pub struct DeleteMessage {
    /// Unique identifier for the target chat
    pub chat_id: i64,
    /// Identifier of the message to delete
    pub message_id: i64,
}

impl DeleteMessage {
    #[must_use]
    pub const fn new(chat_id: i64, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

impl TelegramMethod for DeleteMessage {
    type Method = Self;
    type Return = bool;

    fn build_request<Client>(&self, _bot: &Bot<Client>) -> Request<'_, Self::Method> {
        Request::new("deleteMessage", self)
    }
}

impl AsRef<DeleteMessage> for DeleteMessage {
    fn as_ref(&self) -> &Self {
        self
    }
}
