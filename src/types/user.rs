use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::borrow::Cow;

/// This object represents a Telegram user or bot.
/// # Documentation
/// <https://core.telegram.org/bots/api#user>
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    /// Unique identifier for this user or bot. This number may have more than 32 significant bits, but it has at most 52, so a 64-bit integer is safe for storing it.
    pub id: i64,
    /// `true`, if this user is a bot
    pub is_bot: bool,
    /// User's or bot's first name
    pub first_name: String,
    /// User's or bot's last name
    pub last_name: Option<String>,
    /// User's or bot's username
    pub username: Option<String>,
    /// [`IETF language tag`](https://en.wikipedia.org/wiki/IETF_language_tag) of the user's language
    pub language_code: Option<String>,
}

impl User {
    #[must_use]
    pub fn new(id: i64, is_bot: bool, first_name: impl Into<String>) -> Self {
        Self {
            id,
            is_bot,
            first_name: first_name.into(),
            last_name: None,
            username: None,
            language_code: None,
        }
    }

    #[must_use]
    pub fn last_name(self, val: impl Into<String>) -> Self {
        Self {
            last_name: Some(val.into()),
            ..self
        }
    }

    #[must_use]
    pub fn last_name_option(self, val: Option<impl Into<String>>) -> Self {
        Self {
            last_name: val.map(Into::into),
            ..self
        }
    }

    #[must_use]
    pub fn full_name(&self) -> Cow<'_, str> {
        match (&self.first_name, &self.last_name) {
            (first_name, Some(last_name)) => Cow::Owned(format!("{first_name} {last_name}")),
            (first_name, None) => Cow::Borrowed(first_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name() {
        assert_eq!(User::new(1, false, "Ada").full_name(), "Ada");
        assert_eq!(
            User::new(1, false, "Ada").last_name("Lovelace").full_name(),
            "Ada Lovelace"
        );
    }
}
