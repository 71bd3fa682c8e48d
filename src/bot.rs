//! One running bot: its platform client, Designer Service client, webhook registration
//! and long-running background activities.
//!
//! A bot exists between `start` and `stop`. Start registers the command menu and the
//! webhook and spawns the token watchdog and the background-task runner; stop removes
//! the webhook best-effort and cancels both activities.

use crate::{
    client::{Bot as ClientBot, Reqwest},
    config::Config,
    designer::{api::TriggerFilter, Api},
    errors::HubErrorKind,
    flow::{router, FlowContext},
    hub::Hub,
    methods::{DeleteWebhook, GetMe, SetMyCommands, SetWebhook},
    storage::EventStorage,
    tasks,
    types::{BotCommand, Update, User},
    utils::token,
};

use redis::aio::ConnectionManager;
use std::sync::{Arc, Mutex, Weak};
use tokio::task::JoinHandle;
use tracing::{event, instrument, Level};
use url::Url;

/// Update types the webhook subscribes to
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// A bot running inside this hub process
pub struct Bot {
    /// Id of the bot on the Designer Service
    pub service_id: i64,
    /// Platform client, shared with every traversal
    pub client: Arc<ClientBot<Reqwest>>,
    /// The bot's platform identity, fetched once at start
    pub me: Arc<User>,
    /// Designer Service client scoped to this bot
    pub api: Arc<Api>,
    /// Designer Service root, used to resolve designer-hosted media URLs
    pub service_url: Url,
    /// Scratch store connection
    pub redis: ConnectionManager,
    hub: Weak<Hub>,
    config: Arc<Config>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Bot {
    /// Builds the bot and verifies its token against the platform.
    /// # Errors
    /// [`HubErrorKind::InvalidBotToken`] if the token is malformed or the platform rejects it
    pub async fn new(
        hub: &Arc<Hub>,
        config: Arc<Config>,
        redis: ConnectionManager,
        service_id: i64,
        bot_token: &str,
    ) -> Result<Arc<Self>, HubErrorKind> {
        if token::extract_bot_id(bot_token).is_none() {
            return Err(HubErrorKind::InvalidBotToken);
        }

        let client = Arc::new(ClientBot::new(bot_token));

        let me = client.send(GetMe::new()).await.map_err(|err| {
            if err.is_invalid_token() {
                HubErrorKind::InvalidBotToken
            } else {
                HubErrorKind::Platform(err)
            }
        })?;

        let api = Arc::new(Api::new(
            &config.service_url,
            &config.service_token,
            service_id,
        ));

        Ok(Arc::new(Self {
            service_id,
            client,
            me: Arc::new(me),
            api,
            service_url: config.service_url.clone(),
            redis,
            hub: Arc::downgrade(hub),
            config,
            task_handles: Mutex::new(vec![]),
        }))
    }

    /// Registers triggers carrying a described, payload-less command as the visible menu
    async fn set_menu_commands(&self) {
        let triggers = match self
            .api
            .get_triggers(&TriggerFilter {
                has_command: Some(true),
                has_command_payload: Some(false),
                has_command_description: Some(true),
                ..TriggerFilter::default()
            })
            .await
        {
            Ok(triggers) => triggers,
            Err(err) => {
                event!(Level::WARN, error = %err, "Cannot fetch menu command triggers");

                return;
            }
        };

        let commands: Vec<_> = triggers
            .iter()
            .filter_map(|trigger| trigger.command.as_ref())
            .filter_map(|command| {
                let description = command.description.as_ref()?;
                let name: String = command
                    .command
                    .chars()
                    .filter(|ch| !ch.is_ascii_punctuation())
                    .collect();

                Some(BotCommand::new(name, description))
            })
            .collect();

        if commands.is_empty() {
            return;
        }

        if let Err(err) = self.client.send(SetMyCommands::new(commands)).await {
            event!(Level::WARN, error = %err, "Cannot set menu commands");
        }
    }

    /// Registers the webhook and spawns the watchdog and the background runner.
    /// # Errors
    /// [`HubErrorKind::InvalidBotToken`] if the platform rejects the token,
    /// [`HubErrorKind::Platform`] on any other platform failure
    #[instrument(skip(self), fields(service_id = self.service_id, bot_id = self.client.bot_id))]
    pub async fn start(self: &Arc<Self>) -> Result<(), HubErrorKind> {
        self.set_menu_commands().await;

        let webhook_url = format!(
            "{self_url}/telegram/bots/{service_id}/webhook/",
            self_url = self.config.self_url.as_str().trim_end_matches('/'),
            service_id = self.service_id,
        );

        self.client
            .send(
                SetWebhook::new(webhook_url)
                    .allowed_updates(ALLOWED_UPDATES)
                    .secret_token(&self.config.telegram_token),
            )
            .await
            .map_err(|err| {
                if err.is_invalid_token() {
                    HubErrorKind::InvalidBotToken
                } else {
                    HubErrorKind::Platform(err)
                }
            })?;

        let mut task_handles = self.task_handles.lock().expect("Task handles lock poisoned");
        task_handles.push(tokio::spawn(tasks::monitor_token(Arc::clone(self))));
        task_handles.push(tokio::spawn(tasks::run_background_tasks(Arc::clone(self))));

        event!(Level::INFO, "Bot is started");

        Ok(())
    }

    /// Deletes the webhook best-effort and cancels background activities
    #[instrument(skip(self), fields(service_id = self.service_id, bot_id = self.client.bot_id))]
    pub async fn stop(&self) {
        if let Err(err) = self.client.send(DeleteWebhook::new()).await {
            event!(Level::WARN, error = %err, "Cannot delete webhook");
        }

        let task_handles: Vec<_> = {
            let mut task_handles = self.task_handles.lock().expect("Task handles lock poisoned");

            task_handles.drain(..).collect()
        };

        for task_handle in task_handles {
            task_handle.abort();
        }

        event!(Level::INFO, "Bot is stopped");
    }

    /// Asks the owning hub to stop and unregister this bot; used by the token watchdog
    pub(crate) async fn stop_via_hub(&self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };

        if let Err(err) = hub.stop_bot(self.service_id).await {
            event!(Level::WARN, error = %err, "Watchdog cannot stop the bot");
        }
    }

    /// Drives one webhook update through the flow engine
    pub async fn feed_webhook_update(self: &Arc<Self>, update: Update) {
        let storage = EventStorage::new(
            &self.redis,
            self.client.bot_id,
            update.chat().map(|chat| chat.id),
            update.user().map(|user| user.id),
        );

        let ctx = FlowContext {
            client: Arc::clone(&self.client),
            me: Arc::clone(&self.me),
            api: Arc::clone(&self.api),
            service_url: self.service_url.clone(),
            storage,
            update: Arc::new(update),
        };

        router::handle_update(&ctx).await;
    }
}
