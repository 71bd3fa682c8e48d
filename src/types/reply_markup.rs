use serde::Serialize;
use serde_with::skip_serializing_none;

/// This object represents an [`inline keyboard`](https://core.telegram.org/bots/features#inline-keyboards) that appears right next to the message it belongs to.
/// # Documentation
/// <https://core.telegram.org/bots/api#inlinekeyboardmarkup>
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardMarkup {
    /// Array of button rows, each represented by an array of [`InlineKeyboardButton`] objects
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    #[must_use]
    pub fn new(inline_keyboard: impl IntoIterator<Item = Vec<InlineKeyboardButton>>) -> Self {
        Self {
            inline_keyboard: inline_keyboard.into_iter().collect(),
        }
    }
}

/// This object represents one button of an inline keyboard.
/// # Documentation
/// <https://core.telegram.org/bots/api#inlinekeyboardbutton>
#[skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardButton {
    /// Label text on the button
    pub text: String,
    /// HTTP or `tg://` URL to be opened when the button is pressed
    pub url: Option<String>,
    /// Data to be sent in a callback query to the bot when button is pressed, 1-64 bytes
    pub callback_data: Option<String>,
}

impl InlineKeyboardButton {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: None,
        }
    }

    #[must_use]
    pub fn url(self, val: impl Into<String>) -> Self {
        Self {
            url: Some(val.into()),
            ..self
        }
    }

    #[must_use]
    pub fn callback_data(self, val: impl Into<String>) -> Self {
        Self {
            callback_data: Some(val.into()),
            ..self
        }
    }
}

/// This object represents a [`custom keyboard`](https://core.telegram.org/bots/features#keyboards) with reply options.
/// # Documentation
/// <https://core.telegram.org/bots/api#replykeyboardmarkup>
#[skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ReplyKeyboardMarkup {
    /// Array of button rows, each represented by an array of [`KeyboardButton`] objects
    pub keyboard: Vec<Vec<KeyboardButton>>,
    /// Requests clients to resize the keyboard vertically for optimal fit
    pub resize_keyboard: Option<bool>,
}

impl ReplyKeyboardMarkup {
    #[must_use]
    pub fn new(keyboard: impl IntoIterator<Item = Vec<KeyboardButton>>) -> Self {
        Self {
            keyboard: keyboard.into_iter().collect(),
            resize_keyboard: None,
        }
    }

    #[must_use]
    pub fn resize_keyboard(self, val: bool) -> Self {
        Self {
            resize_keyboard: Some(val),
            ..self
        }
    }
}

/// This object represents one button of the reply keyboard.
/// # Documentation
/// <https://core.telegram.org/bots/api#keyboardbutton>
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct KeyboardButton {
    /// Text of the button
    pub text: String,
}

impl KeyboardButton {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Additional interface options attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline(InlineKeyboardMarkup),
    Reply(ReplyKeyboardMarkup),
}

impl From<InlineKeyboardMarkup> for ReplyMarkup {
    fn from(markup: InlineKeyboardMarkup) -> Self {
        ReplyMarkup::Inline(markup)
    }
}

impl From<ReplyKeyboardMarkup> for ReplyMarkup {
    fn from(markup: ReplyKeyboardMarkup) -> Self {
        ReplyMarkup::Reply(markup)
    }
}
