//! This module contains the [`ErrorKind`] enum for scratch-store failures.

use thiserror;

/// A wrapper for any error that can occur when reading or writing per-chat/per-user scratch state
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Error from the underlying key-value store
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
    /// The stored value is not a JSON object. Handlers must log and skip the operation.
    #[error("The entry at `{key}` must be a JSON object")]
    Corrupted { key: Box<str> },
    /// Error while parsing JSON
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}
