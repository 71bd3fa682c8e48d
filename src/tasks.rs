//! Long-running per-bot activities: the token watchdog and the background-task runner.
//!
//! Both loops are spawned at bot start and aborted at stop.

use crate::{
    bot::Bot,
    designer::{self, models::BackgroundTask},
    errors::FlowErrorKind,
    flow::{validation::is_valid_user, variables::Variables, walker, FlowContext},
    methods::GetMe,
    storage::{EventStorage, Storage},
    types::{Chat, Update, User},
};

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Bot-level scratch key holding `{task_id → last_run_iso}`
pub const BACKGROUND_TASKS_KEY: &str = "background_tasks";

const WATCHDOG_INTERVAL_SECONDS: u64 = 86_400;
const RUNNER_INTERVAL_SECONDS: u64 = 3_600;
/// A synthetic user's first name is capped at this many characters,
/// the remainder of the full name becomes the last name
const FIRST_NAME_MAX_CHARS: usize = 64;

/// Probes the token daily; an invalid token stops the owning bot
pub async fn monitor_token(bot: Arc<Bot>) {
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(WATCHDOG_INTERVAL_SECONDS)).await;

        if let Err(err) = bot.client.send(GetMe::new()).await {
            if err.is_invalid_token() {
                event!(
                    Level::WARN,
                    service_id = bot.service_id,
                    "Bot token became invalid, stopping the bot",
                );

                bot.stop_via_hub().await;

                return;
            }

            event!(Level::WARN, error = %err, "Token probe failed");
        }
    }
}

/// Splits a designer-side full name into platform first/last names
fn split_full_name(full_name: &str) -> (String, Option<String>) {
    let first_name: String = full_name.chars().take(FIRST_NAME_MAX_CHARS).collect();
    let last_name: String = full_name.chars().skip(FIRST_NAME_MAX_CHARS).collect();

    (first_name, (!last_name.is_empty()).then_some(last_name))
}

/// Drives one task's connections for one user with a synthetic update
async fn run_task_for_user(
    bot: &Arc<Bot>,
    service_bot: &designer::models::Bot,
    user: &designer::models::User,
    task: &BackgroundTask,
) {
    if !is_valid_user(service_bot, user) {
        return;
    }

    let (first_name, last_name) = split_full_name(&user.full_name);
    let platform_user = User::new(user.telegram_id, false, first_name.clone())
        .last_name_option(last_name.clone());
    let chat = Chat::new_private(user.telegram_id, first_name).last_name_option(last_name);
    let update = Update::synthetic(platform_user, chat);

    let ctx = FlowContext {
        client: Arc::clone(&bot.client),
        me: Arc::clone(&bot.me),
        api: Arc::clone(&bot.api),
        service_url: bot.service_url.clone(),
        storage: EventStorage::new(
            &bot.redis,
            bot.client.bot_id,
            Some(user.telegram_id),
            Some(user.telegram_id),
        ),
        update: Arc::new(update),
    };
    let variables = Variables::new(
        Arc::clone(&bot.api),
        &bot.me,
        ctx.update.user(),
        None,
    );

    walker::handle_many(&ctx, task.source_connections.clone(), &variables, 0).await;
}

/// Runs one due task for every user, fetching the bot and user list lazily once per iteration
async fn run_task(
    bot: &Arc<Bot>,
    task: &BackgroundTask,
    service_bot: &mut Option<designer::models::Bot>,
    users: &mut Option<Vec<designer::models::User>>,
) -> Result<(), FlowErrorKind> {
    if service_bot.is_none() {
        *service_bot = Some(bot.api.get_bot().await?);
    }
    if users.is_none() {
        *users = Some(bot.api.get_users().await?);
    }

    let service_bot = service_bot.as_ref().expect("Bot was just fetched");
    let users = users.as_ref().expect("Users were just fetched");

    join_all(
        users
            .iter()
            .map(|user| run_task_for_user(bot, service_bot, user, task)),
    )
    .await;

    Ok(())
}

fn last_run(state: &Map<String, Value>, task_id: i64) -> Option<DateTime<Utc>> {
    state
        .get(&task_id.to_string())
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[instrument(skip(bot), fields(service_id = bot.service_id))]
async fn process_background_tasks(bot: &Arc<Bot>) -> Result<(), FlowErrorKind> {
    let tasks = bot.api.get_background_tasks().await?;

    if tasks.is_empty() {
        return Ok(());
    }

    let storage = Storage::new(bot.redis.clone(), bot.client.bot_id, None, None);
    let mut state = match storage.get(BACKGROUND_TASKS_KEY).await? {
        Some(Value::Object(state)) => state,
        _ => Map::new(),
    };

    let now = Utc::now();

    let mut service_bot: Option<designer::models::Bot> = None;
    let mut users: Option<Vec<designer::models::User>> = None;

    for task in &tasks {
        let Some(task_last_run) = last_run(&state, task.id) else {
            // First sight: record now, the task runs one interval from here
            state.insert(task.id.to_string(), json!(now.to_rfc3339()));
            continue;
        };

        if task_last_run + Duration::days(task.interval.days()) > now {
            continue;
        }

        // Failures of one task are swallowed so its neighbors still run
        match run_task(bot, task, &mut service_bot, &mut users).await {
            Ok(()) => {
                state.insert(task.id.to_string(), json!(now.to_rfc3339()));
            }
            Err(err) => {
                event!(Level::WARN, error = %err, task_id = task.id, "Background task failed");
            }
        }
    }

    storage
        .set(BACKGROUND_TASKS_KEY, Value::Object(state))
        .await?;

    Ok(())
}

/// Hourly loop firing due background tasks; one task's failure never blocks the others
pub async fn run_background_tasks(bot: Arc<Bot>) {
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(RUNNER_INTERVAL_SECONDS)).await;

        if let Err(err) = process_background_tasks(&bot).await {
            event!(Level::WARN, error = %err, "Background task processing failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_splitting() {
        let (first_name, last_name) = split_full_name("Ada Lovelace");
        assert_eq!(first_name, "Ada Lovelace");
        assert_eq!(last_name, None);

        let long_name = "a".repeat(70);
        let (first_name, last_name) = split_full_name(&long_name);
        assert_eq!(first_name.chars().count(), 64);
        assert_eq!(last_name.as_deref(), Some("aaaaaa"));
    }

    #[test]
    fn last_run_parses_stored_timestamps() {
        let mut state = Map::new();
        state.insert("7".to_owned(), json!("2026-07-01T00:00:00+00:00"));
        state.insert("8".to_owned(), json!("not a timestamp"));

        assert!(last_run(&state, 7).is_some());
        assert!(last_run(&state, 8).is_none());
        assert!(last_run(&state, 9).is_none());
    }
}
