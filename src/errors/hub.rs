//! This module contains the [`ErrorKind`] enum for control-plane failures,
//! which are surfaced to the HTTP control surface as error responses with a machine-readable code.

use super::SessionErrorKind;

use thiserror;

/// Control-plane error for bot lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Operation addressed a service id that has no running bot
    #[error("The bot was not found, because it is not started here.")]
    NotFoundBot,
    /// `start` was called for a service id that is already running
    #[error("The bot is already enabled.")]
    BotAlreadyEnabled,
    /// The platform rejected the bot token, either at start or later inside the watchdog
    #[error("The API token is invalid for the bot.")]
    InvalidBotToken,
    /// The platform failed a lifecycle request for another reason
    #[error(transparent)]
    Platform(#[from] SessionErrorKind),
}

impl ErrorKind {
    /// Machine-readable code used in HTTP error bodies
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFoundBot => "not_found_bot",
            ErrorKind::BotAlreadyEnabled => "bot_already_enabled",
            ErrorKind::InvalidBotToken => "invalid_bot_token",
            ErrorKind::Platform(_) => "platform_error",
        }
    }
}