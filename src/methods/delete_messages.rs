use super::base::{Request, TelegramMethod};

use crate::client::Bot;

use serde::Serialize;

/// Use this method to delete multiple messages simultaneously.
/// If some of the specified messages can't be found, they are skipped.
/// # Documentation
/// <https://core.telegram.org/bots/api#deletemessages>
/// # Returns
/// Returns `true` on success
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, Serialize)]
pub struct DeleteMessages {
    /// Unique identifier for the target chat
    pub chat_id: i64,
    /// A list of 1-100 identifiers of messages to delete
    pub message_ids: Vec<i64>,
}

impl DeleteMessages {
    #[must_use]
    pub fn new(chat_id: i64, message_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            chat_id,
            message_ids: message_ids.into_iter().collect(),
        }
    }
}

impl TelegramMethod for DeleteMessages {
    type Method = Self;
    type Return = bool;

    fn build_request<Client>(&self, _bot: &Bot<Client>) -> Request<'_, Self::Method> {
        Request::new("deleteMessages", self)
    }
}

impl AsRef<DeleteMessages> for DeleteMessages {
    fn as_ref(&self) -> &Self {
        self
    }
}
