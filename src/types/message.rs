use super::{Chat, User};

use serde::Deserialize;

/// This object represents a message.
/// # Notes
/// Only the fields the hub reads are modelled; everything else the API returns is ignored.
/// # Documentation
/// <https://core.telegram.org/bots/api#message>
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Message {
    /// Unique message identifier inside this chat
    #[serde(rename = "message_id")]
    pub id: i64,
    /// Sender of the message; empty for messages sent to channels
    pub from: Option<User>,
    /// Date the message was sent in Unix time
    pub date: i64,
    /// Chat the message belongs to
    pub chat: Chat,
    /// For text messages, the actual UTF-8 text of the message
    pub text: Option<String>,
}

impl Message {
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}
