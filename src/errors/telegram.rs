//! This module contains the [`ErrorKind`] enum, which represents errors returned by the Telegram Bot API itself.
//!
//! Variants mirror the error classes the API distinguishes by status code and response parameters.
//! Check <https://core.telegram.org/api/errors> for more information about the errors.

use anyhow;
use thiserror;

/// Represents an error returned by the Telegram Bot API.
/// # Notes
/// [`ErrorKind::RetryAfter`] is special: the session wrapper retries the request once after the advised delay
/// before surfacing it to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The flood control is exceeded and the request can be repeated after `retry_after` seconds
    #[error("TelegramRetryAfter: {message} (retry after {retry_after} seconds, {url})")]
    RetryAfter {
        url: &'static str,
        message: Box<str>,
        retry_after: i64,
    },
    /// The group has been migrated to a supergroup with the specified identifier
    #[error("TelegramMigrateToChat: {message} (migrate to chat id {migrate_to_chat_id}, {url})")]
    MigrateToChat {
        url: &'static str,
        message: Box<str>,
        migrate_to_chat_id: i64,
    },
    #[error("TelegramBadRequest: {message}")]
    BadRequest { message: Box<str> },
    /// The bot token is invalid or was revoked
    #[error("TelegramUnauthorized: {message}")]
    Unauthorized { message: Box<str> },
    #[error("TelegramForbidden: {message}")]
    Forbidden { message: Box<str> },
    #[error("TelegramNotFound: {message}")]
    NotFound { message: Box<str> },
    #[error("TelegramConflictError: {message}")]
    ConflictError { message: Box<str> },
    #[error("TelegramEntityTooLarge: {message} ({url})")]
    EntityTooLarge {
        url: &'static str,
        message: Box<str>,
    },
    #[error("TelegramRestartingTelegram: {message}")]
    RestartingTelegram { message: Box<str> },
    #[error("TelegramServerError: {message}")]
    ServerError { message: Box<str> },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ErrorKind {
    /// `true` if the error means the bot token is no longer usable
    #[must_use]
    pub const fn is_invalid_token(&self) -> bool {
        matches!(self, ErrorKind::Unauthorized { .. })
    }
}
