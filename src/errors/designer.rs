//! This module contains the [`ErrorKind`] enum for failures of the Designer Service client.
//!
//! Traversal code treats any of these as a branch-local failure: the branch is cut and logged,
//! siblings are unaffected.

use thiserror;

/// A wrapper for any error that can occur when talking to the Designer Service
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Error while sending request or reading response
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status code
    #[error("Designer service returned status {status} for `{url}`")]
    Status { status: u16, url: Box<str> },
    /// Error while parsing JSON
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
    /// Error while building a collection URL
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
