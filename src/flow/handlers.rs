//! One handler per flow-node kind.
//!
//! Every handler receives the node snapshot, the traversal context and the branch's
//! forked variables bag, and returns the node's outgoing connections on success or
//! `None` to cut the branch. Handlers only ever *add* entries to the forked bag.

pub mod api_request;
pub mod condition;
pub mod database_operation;
pub mod message;
pub mod trigger;

use crate::{designer::models::Connection, errors::FlowErrorKind};

/// `Ok(Some(connections))` continues the branch, `Ok(None)` cuts it
pub type HandlerResult = Result<Option<Vec<Connection>>, FlowErrorKind>;
