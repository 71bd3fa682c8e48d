//! Fans out over connections, fetches each target node and dispatches its handler,
//! recursing over the connections the handler returns.
//!
//! Every branch runs on its own fork of the variables bag, so siblings never observe
//! each other's additions. A branch failure is logged and cuts only that branch.

use super::{
    handlers::{self, HandlerResult},
    variables::Variables,
    FlowContext,
};

use crate::designer::{enums::ConnectionTargetObjectType, models::Connection};

use futures::{
    future::{join_all, BoxFuture},
    FutureExt as _,
};
use tracing::{event, instrument, Level};

/// Traversal depth cap guarding against runaway graphs
pub const MAX_TRAVERSAL_DEPTH: usize = 64;

/// Fetches the connection's target node and runs its handler
async fn dispatch(
    ctx: &FlowContext,
    connection: &Connection,
    variables: &mut Variables,
) -> HandlerResult {
    let target_object_id = connection.target_object_id;

    match connection.target_object_type {
        ConnectionTargetObjectType::Trigger => {
            let trigger = ctx.api.get_trigger(target_object_id).await?;

            handlers::trigger::handle(&trigger, &ctx.storage).await
        }
        ConnectionTargetObjectType::Message => {
            let message = ctx.api.get_message(target_object_id).await?;

            handlers::message::handle(ctx, &message, variables).await
        }
        ConnectionTargetObjectType::Condition => {
            let condition = ctx.api.get_condition(target_object_id).await?;

            handlers::condition::handle(&condition, variables).await
        }
        ConnectionTargetObjectType::ApiRequest => {
            let api_request = ctx.api.get_api_request(target_object_id).await?;

            handlers::api_request::handle(ctx, &api_request, variables).await
        }
        ConnectionTargetObjectType::DatabaseOperation => {
            let database_operation = ctx.api.get_database_operation(target_object_id).await?;

            handlers::database_operation::handle(&ctx.api, &database_operation, variables).await
        }
    }
}

/// Walks one connection on a fresh fork of the parent's variables
#[instrument(skip(ctx, connection, variables), fields(
    connection_id = connection.id,
    target_object_type = %connection.target_object_type,
    target_object_id = connection.target_object_id,
))]
async fn handle(ctx: &FlowContext, connection: Connection, mut variables: Variables, depth: usize) {
    match dispatch(ctx, &connection, &mut variables).await {
        Ok(Some(connections)) if !connections.is_empty() => {
            handle_many(ctx, connections, &variables, depth + 1).await;
        }
        Ok(_) => {}
        Err(err) => {
            event!(
                Level::WARN,
                error = %err,
                "Connection handling failed, siblings are unaffected",
            );
        }
    }
}

/// Fans out concurrently over `connections`; each branch forks `variables`
pub fn handle_many<'a>(
    ctx: &'a FlowContext,
    connections: Vec<Connection>,
    variables: &'a Variables,
    depth: usize,
) -> BoxFuture<'a, ()> {
    async move {
        if depth > MAX_TRAVERSAL_DEPTH {
            event!(
                Level::ERROR,
                depth,
                "Traversal depth cap reached, dropping the remaining branches",
            );

            return;
        }

        join_all(
            connections
                .into_iter()
                .map(|connection| handle(ctx, connection, variables.clone(), depth)),
        )
        .await;
    }
    .boxed()
}
