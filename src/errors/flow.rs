//! This module contains the [`ErrorKind`] enum for failures inside one traversal branch.
//!
//! The connection walker logs these per branch; siblings keep running.

use super::{DesignerErrorKind, SessionErrorKind, StorageErrorKind};

use thiserror;

/// A wrapper for any error a node handler can produce
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The Designer Service could not provide or accept a flow object
    #[error(transparent)]
    Designer(#[from] DesignerErrorKind),
    /// The platform rejected or failed a send
    #[error(transparent)]
    Session(#[from] SessionErrorKind),
    /// The scratch store failed or is corrupted
    #[error(transparent)]
    Storage(#[from] StorageErrorKind),
}
