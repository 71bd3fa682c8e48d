use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// This object represents a chat.
/// # Documentation
/// <https://core.telegram.org/bots/api#chat>
#[skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Chat {
    /// Unique identifier for this chat
    pub id: i64,
    /// Type of chat, can be either `private`, `group`, `supergroup` or `channel`
    #[serde(rename = "type")]
    pub chat_type: String,
    /// Title, for supergroups, channels and group chats
    pub title: Option<String>,
    /// Username, for private chats, supergroups and channels if available
    pub username: Option<String>,
    /// First name of the other party in a private chat
    pub first_name: Option<String>,
    /// Last name of the other party in a private chat
    pub last_name: Option<String>,
}

impl Chat {
    /// Creates a private chat, as used for synthetic background updates
    #[must_use]
    pub fn new_private(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            chat_type: "private".to_owned(),
            title: None,
            username: None,
            first_name: Some(first_name.into()),
            last_name: None,
        }
    }

    #[must_use]
    pub fn last_name_option(self, val: Option<impl Into<String>>) -> Self {
        Self {
            last_name: val.map(Into::into),
            ..self
        }
    }
}
