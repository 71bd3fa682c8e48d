//! Matches one incoming update to the starting connections of the bot's flow graph
//! and hands them to the walker.
//!
//! Three fetchers run concurrently: the armed expected trigger, command/message
//! triggers, and keyboard buttons. Their results are concatenated in that order.

use super::{
    handlers::trigger::EXPECTED_TRIGGER_ID_KEY,
    validation::validate_platform_user,
    variables::{replace_text_variables, Variables},
    walker, FlowContext,
};

use crate::{
    designer::{
        api::TriggerFilter,
        models::{Connection, Trigger},
    },
    errors::FlowErrorKind,
    types::UpdateKind,
};

use futures::future::join_all;
use tracing::{event, instrument, Level};

/// Splits slash-prefixed input into `(command, payload)`
fn split_command(text: &str) -> Option<(&str, Option<&str>)> {
    let rest = text.strip_prefix('/')?;

    if rest.is_empty() {
        return None;
    }

    match rest.split_once(' ') {
        Some((command, payload)) => Some((command, (!payload.is_empty()).then_some(payload))),
        None => Some((rest, None)),
    }
}

/// Whether the armed trigger matches the current input
async fn trigger_matches(trigger: &Trigger, text: Option<&str>, variables: &Variables) -> bool {
    let Some(text) = text else {
        return false;
    };

    if let Some(trigger_command) = &trigger.command {
        if let Some((command, payload)) = split_command(text) {
            if command == trigger_command.command && payload == trigger_command.payload.as_deref() {
                return true;
            }
        }
    }

    if let Some(trigger_message) = &trigger.message {
        match &trigger_message.text {
            // A text-less message trigger matches any message
            None => return true,
            Some(template) => {
                if replace_text_variables(template, variables).await == text {
                    return true;
                }
            }
        }
    }

    false
}

/// Consumes the expected trigger armed by a previous traversal, if it matches
async fn expected_trigger_connections(
    ctx: &FlowContext,
    variables: &Variables,
) -> Result<Vec<Connection>, FlowErrorKind> {
    let Some(user_storage) = &ctx.storage.user else {
        return Ok(vec![]);
    };

    let Some(trigger_id) = user_storage
        .get(EXPECTED_TRIGGER_ID_KEY)
        .await?
        .as_ref()
        .and_then(serde_json::Value::as_i64)
    else {
        return Ok(vec![]);
    };

    let trigger = ctx.api.get_trigger(trigger_id).await?;

    if !trigger_matches(&trigger, ctx.update.text(), variables).await {
        return Ok(vec![]);
    }

    user_storage.delete(EXPECTED_TRIGGER_ID_KEY).await?;

    Ok(trigger.source_connections)
}

async fn command_triggers(ctx: &FlowContext, text: &str) -> Result<Vec<Trigger>, FlowErrorKind> {
    let Some((command, payload)) = split_command(text) else {
        return Ok(vec![]);
    };

    Ok(ctx
        .api
        .get_triggers(&TriggerFilter {
            command: Some(command),
            command_payload: payload,
            has_command_payload: Some(payload.is_some()),
            has_target_connections: Some(false),
            ..TriggerFilter::default()
        })
        .await?)
}

async fn message_triggers(
    ctx: &FlowContext,
    text: &str,
    variables: &Variables,
) -> Result<Vec<Trigger>, FlowErrorKind> {
    let triggers = ctx
        .api
        .get_triggers(&TriggerFilter {
            has_message: Some(true),
            has_target_connections: Some(false),
            ..TriggerFilter::default()
        })
        .await?;

    let matches = join_all(triggers.iter().map(|trigger| async move {
        match trigger.message.as_ref().and_then(|message| message.text.as_ref()) {
            Some(template) => replace_text_variables(template, variables).await == text,
            // A text-less message trigger is an "any message" catch-all
            None => trigger.message.is_some(),
        }
    }))
    .await;

    Ok(triggers
        .into_iter()
        .zip(matches)
        .filter_map(|(trigger, matches)| matches.then_some(trigger))
        .collect())
}

/// Command and message triggers matching the update's text
async fn trigger_connections(
    ctx: &FlowContext,
    variables: &Variables,
) -> Result<Vec<Connection>, FlowErrorKind> {
    let Some(text) = ctx.update.text() else {
        return Ok(vec![]);
    };

    let (command_triggers, message_triggers) = tokio::try_join!(
        command_triggers(ctx, text),
        message_triggers(ctx, text, variables),
    )?;

    Ok(command_triggers
        .into_iter()
        .chain(message_triggers)
        .flat_map(|trigger| trigger.source_connections)
        .collect())
}

/// Keyboard buttons referenced by callback data or typed reply-keyboard text
async fn keyboard_button_connections(ctx: &FlowContext) -> Result<Vec<Connection>, FlowErrorKind> {
    let buttons = match &ctx.update.kind {
        UpdateKind::CallbackQuery(callback_query) => {
            match callback_query
                .data
                .as_ref()
                .and_then(|data| data.parse::<i64>().ok())
            {
                Some(button_id) => ctx.api.get_keyboard_buttons_by_id(button_id).await?,
                None => vec![],
            }
        }
        UpdateKind::Message(message) => match message.text() {
            Some(text) => ctx.api.get_keyboard_buttons_by_text(text).await?,
            None => vec![],
        },
        UpdateKind::Synthetic { .. } => vec![],
    };

    Ok(buttons
        .into_iter()
        .flat_map(|button| button.source_connections)
        .collect())
}

/// Routes one update: validates the user, gathers starting connections and walks them.
///
/// Invalid users and fetcher failures drop the update silently apart from a log line.
#[instrument(skip(ctx), fields(update_id = ctx.update.id))]
pub async fn handle_update(ctx: &FlowContext) {
    if let Some(user) = ctx.update.user() {
        match validate_platform_user(&ctx.api, user).await {
            Ok(true) => {}
            Ok(false) => {
                event!(Level::DEBUG, user_id = user.id, "Update dropped: user is not valid");

                return;
            }
            Err(err) => {
                event!(Level::WARN, error = %err, "Cannot validate user, dropping the update");

                return;
            }
        }
    }

    let variables = Variables::new(
        ctx.api.clone(),
        &ctx.me,
        ctx.update.user(),
        ctx.update.message(),
    );

    let (expected, triggers, buttons) = tokio::join!(
        expected_trigger_connections(ctx, &variables),
        trigger_connections(ctx, &variables),
        keyboard_button_connections(ctx),
    );

    let mut connections = vec![];

    for fetched in [expected, triggers, buttons] {
        match fetched {
            Ok(fetched) => connections.extend(fetched),
            Err(err) => {
                event!(Level::WARN, error = %err, "Starting-connection fetcher failed");
            }
        }
    }

    walker::handle_many(ctx, connections, &variables, 0).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_splitting() {
        assert_eq!(split_command("/start"), Some(("start", None)));
        assert_eq!(split_command("/start now"), Some(("start", Some("now"))));
        assert_eq!(split_command("/start "), Some(("start", None)));
        assert_eq!(split_command("plain text"), None);
        assert_eq!(split_command("/"), None);
    }
}
