//! The flow engine: everything between an incoming update and the side effects it produces.
//!
//! One platform update induces one *traversal* of the bot's flow graph. The
//! [`router`] resolves the starting connections, the [`walker`] fans out over them and
//! recurses through node handlers, and [`variables`] carries the per-traversal state
//! that conditional branches fork by copy.

pub mod handlers;
pub mod media;
pub mod router;
pub mod validation;
pub mod variables;
pub mod walker;

use crate::{
    client::{Bot, Reqwest},
    designer::Api,
    storage::EventStorage,
    types::{Update, User},
};

use std::sync::Arc;
use url::Url;

/// Everything a traversal needs besides its variables bag.
///
/// The context is immutable for the lifetime of one update; branches share it by reference.
#[derive(Debug, Clone)]
pub struct FlowContext {
    /// Platform client of the bot the update belongs to
    pub client: Arc<Bot<Reqwest>>,
    /// The bot's own platform identity, as returned by `getMe`
    pub me: Arc<User>,
    /// Designer Service client scoped to this bot
    pub api: Arc<Api>,
    /// Designer Service root, used to resolve designer-hosted media URLs
    pub service_url: Url,
    /// Scratch handles scoped by `(bot_id, chat_id, user_id)` of the update
    pub storage: EventStorage,
    /// The update driving this traversal
    pub update: Arc<Update>,
}
