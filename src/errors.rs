//! This module contains errors that can be returned by the hub.
//!
//! This module contains errors:
//! - [`HubErrorKind`]
//! - [`SessionErrorKind`]
//! - [`TelegramErrorKind`]
//! - [`DesignerErrorKind`]
//! - [`StorageErrorKind`]
//! - [`FlowErrorKind`]
//! Check the documentation for each error to see what it means.

#![allow(clippy::module_name_repetitions)]

pub mod designer;
pub mod flow;
pub mod hub;
pub mod session;
pub mod storage;
pub mod telegram;

pub use designer::ErrorKind as DesignerErrorKind;
pub use flow::ErrorKind as FlowErrorKind;
pub use hub::ErrorKind as HubErrorKind;
pub use session::ErrorKind as SessionErrorKind;
pub use storage::ErrorKind as StorageErrorKind;
pub use telegram::ErrorKind as TelegramErrorKind;
