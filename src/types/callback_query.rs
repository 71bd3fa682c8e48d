use super::{Message, User};

use serde::Deserialize;

/// This object represents an incoming callback query from a callback button in an inline keyboard.
/// # Documentation
/// <https://core.telegram.org/bots/api#callbackquery>
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct CallbackQuery {
    /// Unique identifier for this query
    pub id: String,
    /// Sender
    pub from: User,
    /// Message sent by the bot with the callback button that originated the query
    pub message: Option<Message>,
    /// Data associated with the callback button
    pub data: Option<String>,
}
