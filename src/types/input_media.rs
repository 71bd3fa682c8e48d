use serde::Serialize;

/// This object represents the content of a media message to be sent as part of a media group.
/// # Notes
/// The hub always sends designer-hosted files by URL, so only the `media` field is carried.
/// # Documentation
/// <https://core.telegram.org/bots/api#inputmedia>
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputMedia {
    Photo { media: String },
    Document { media: String },
    Video { media: String },
    Audio { media: String },
}

impl InputMedia {
    #[must_use]
    pub fn media(&self) -> &str {
        match self {
            InputMedia::Photo { media }
            | InputMedia::Document { media }
            | InputMedia::Video { media }
            | InputMedia::Audio { media } => media,
        }
    }
}
