use super::{CallbackQuery, Chat, Message, User};

use serde::Deserialize;

/// This object represents an incoming update.
/// # Notes
/// The hub subscribes only to `message` and `callback_query` updates;
/// the [`UpdateKind::Synthetic`] variant never arrives over the wire, it is produced
/// by the background runner to drive flows without user action.
/// # Documentation
/// <https://core.telegram.org/bots/api#update>
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    #[serde(rename = "update_id")]
    pub id: i64,

    #[serde(flatten)]
    pub kind: UpdateKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// New incoming message of any kind — text, photo, sticker, etc.
    Message(Message),
    /// New incoming callback query
    CallbackQuery(CallbackQuery),
    /// In-process update fabricated by the background runner
    #[serde(skip)]
    Synthetic { user: User, chat: Chat },
}

impl Update {
    /// Fabricates an update for a background task run on behalf of `user`
    #[must_use]
    pub const fn synthetic(user: User, chat: Chat) -> Self {
        Self {
            id: 0,
            kind: UpdateKind::Synthetic { user, chat },
        }
    }

    /// The user this update originates from
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match &self.kind {
            UpdateKind::Message(message) => message.from.as_ref(),
            UpdateKind::CallbackQuery(callback_query) => Some(&callback_query.from),
            UpdateKind::Synthetic { user, .. } => Some(user),
        }
    }

    /// The chat the update belongs to
    #[must_use]
    pub fn chat(&self) -> Option<&Chat> {
        match &self.kind {
            UpdateKind::Message(message) => Some(&message.chat),
            UpdateKind::CallbackQuery(callback_query) => {
                callback_query.message.as_ref().map(|message| &message.chat)
            }
            UpdateKind::Synthetic { chat, .. } => Some(chat),
        }
    }

    /// The message the update carries or refers to
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(message) => Some(message),
            UpdateKind::CallbackQuery(callback_query) => callback_query.message.as_ref(),
            UpdateKind::Synthetic { .. } => None,
        }
    }

    /// The text a trigger can match on: the message text for message updates
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            UpdateKind::Message(message) => message.text(),
            UpdateKind::CallbackQuery(_) | UpdateKind::Synthetic { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn deserialize_message_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 1,
            "message": {
                "message_id": 42,
                "from": {"id": 7, "is_bot": false, "first_name": "Ada"},
                "chat": {"id": 7, "type": "private", "first_name": "Ada"},
                "date": 1706267365,
                "text": "/start",
            },
        }))
        .unwrap();

        assert_eq!(update.id, 1);
        assert_eq!(update.text(), Some("/start"));
        assert_eq!(update.user().map(|user| user.id), Some(7));
        assert_eq!(update.message().map(|message| message.id), Some(42));
    }

    #[test]
    fn deserialize_callback_query_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 2,
            "callback_query": {
                "id": "abc",
                "from": {"id": 7, "is_bot": false, "first_name": "Ada"},
                "data": "123",
            },
        }))
        .unwrap();

        let UpdateKind::CallbackQuery(callback_query) = &update.kind else {
            panic!("Unexpected update kind");
        };

        assert_eq!(callback_query.data.as_deref(), Some("123"));
        assert_eq!(update.text(), None);
        assert!(update.chat().is_none());
    }
}
