use super::base::{Request, TelegramMethod};

use crate::{
    client::Bot,
    types::{InputMedia, Message},
};

use serde::Serialize;
use serde_with::skip_serializing_none;

/// Use this method to send a group of photos, videos, documents or audios as an album.
/// Documents and audio files can be only grouped in an album with messages of the same type.
/// # Documentation
/// <https://core.telegram.org/bots/api#sendmediagroup>
/// # Returns
/// On success, an array of [`Message`]s that were sent is returned
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMediaGroup {
    /// Unique identifier for the target chat
    pub chat_id: i64,
    /// A list describing messages to be sent, must include 2-10 items
    pub media: Vec<InputMedia>,
    /// If the messages are a reply, ID of the original message
    pub reply_to_message_id: Option<i64>,
}

impl SendMediaGroup {
    #[must_use]
    pub fn new(chat_id: i64, media: impl IntoIterator<Item = InputMedia>) -> Self {
        Self {
            chat_id,
            media: media.into_iter().collect(),
            reply_to_message_id: None,
        }
    }

    #[must_use]
    pub fn reply_to_message_id_option(self, val: Option<i64>) -> Self {
        Self {
            reply_to_message_id: val,
            ..self
        }
    }
}

impl TelegramMethod for SendMediaGroup {
    type Method = Self;
    type Return = Vec<Message>;

    fn build_request<Client>(&self, _bot: &Bot<Client>) -> Request<'_, Self::Method> {
        Request::new("sendMediaGroup", self)
    }
}

impl AsRef<SendMediaGroup> for SendMediaGroup {
    fn as_ref(&self) -> &Self {
        self
    }
}
