//! The in-process bot table and the lifecycle operations over it.
//!
//! The [`Hub`] is owned by the HTTP server and injected into handlers; it is the only
//! place that mutates the `{service_id → Bot}` table.

use crate::{bot::Bot, config::Config, errors::HubErrorKind};

use redis::aio::ConnectionManager;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};
use tokio::sync::RwLock;
use tracing::{event, instrument, Level};

/// Holds every bot currently running in this process
pub struct Hub {
    config: Arc<Config>,
    redis: ConnectionManager,
    bots: RwLock<HashMap<i64, Arc<Bot>>>,
    /// Service ids with a start in flight. Reserving an id up front keeps
    /// `bots` free while the start does its network round-trips, so webhook
    /// dispatch and lifecycle ops on other bots are never stalled by one
    /// slow-to-start bot.
    starting: Mutex<HashSet<i64>>,
}

impl Hub {
    #[must_use]
    pub fn new(config: Arc<Config>, redis: ConnectionManager) -> Arc<Self> {
        Arc::new(Self {
            config,
            redis,
            bots: RwLock::new(HashMap::new()),
            starting: Mutex::new(HashSet::new()),
        })
    }

    /// Service ids of the currently-running bots
    pub async fn bot_ids(&self) -> Vec<i64> {
        self.bots.read().await.keys().copied().collect()
    }

    /// # Errors
    /// [`HubErrorKind::NotFoundBot`] if no bot runs under `service_id`
    pub async fn bot(&self, service_id: i64) -> Result<Arc<Bot>, HubErrorKind> {
        self.bots
            .read()
            .await
            .get(&service_id)
            .cloned()
            .ok_or(HubErrorKind::NotFoundBot)
    }

    /// Builds, registers and starts a bot.
    /// # Notes
    /// The table lock is only held for the membership check and the insert/remove
    /// steps, never across the platform and Designer Service round-trips a start
    /// performs. The bot is registered before `start`; a failed start removes the
    /// entry again.
    /// # Errors
    /// - [`HubErrorKind::BotAlreadyEnabled`] if the service id is already running or starting
    /// - [`HubErrorKind::InvalidBotToken`] if the platform rejects the token
    /// - [`HubErrorKind::Platform`] on any other platform failure
    #[instrument(skip(self, bot_token))]
    pub async fn start_bot(
        self: &Arc<Self>,
        service_id: i64,
        bot_token: &str,
    ) -> Result<(), HubErrorKind> {
        {
            let bots = self.bots.read().await;
            let mut starting = self.starting.lock().expect("Starting set lock poisoned");

            if bots.contains_key(&service_id) || !starting.insert(service_id) {
                return Err(HubErrorKind::BotAlreadyEnabled);
            }
        }

        let result = self.start_reserved_bot(service_id, bot_token).await;

        self.starting
            .lock()
            .expect("Starting set lock poisoned")
            .remove(&service_id);

        result
    }

    /// The I/O part of a start, running with `service_id` reserved but no lock held
    async fn start_reserved_bot(
        self: &Arc<Self>,
        service_id: i64,
        bot_token: &str,
    ) -> Result<(), HubErrorKind> {
        let bot = Bot::new(self, Arc::clone(&self.config), self.redis.clone(), service_id, bot_token)
            .await?;

        self.bots.write().await.insert(service_id, Arc::clone(&bot));

        if let Err(err) = bot.start().await {
            self.bots.write().await.remove(&service_id);

            return Err(err);
        }

        Ok(())
    }

    /// Unregisters the bot and tears it down.
    /// # Errors
    /// [`HubErrorKind::NotFoundBot`] if no bot runs under `service_id`
    #[instrument(skip(self))]
    pub async fn stop_bot(&self, service_id: i64) -> Result<(), HubErrorKind> {
        let bot = self
            .bots
            .write()
            .await
            .remove(&service_id)
            .ok_or(HubErrorKind::NotFoundBot)?;

        bot.stop().await;

        Ok(())
    }

    /// `stop` followed by `start` with the same token.
    /// # Errors
    /// [`HubErrorKind::NotFoundBot`] if no bot runs under `service_id`,
    /// plus everything [`Hub::start_bot`] can return
    #[instrument(skip(self))]
    pub async fn restart_bot(self: &Arc<Self>, service_id: i64) -> Result<(), HubErrorKind> {
        let bot_token = self.bot(service_id).await?.client.token.clone();

        self.stop_bot(service_id).await?;

        if let Err(err) = self.start_bot(service_id, &bot_token).await {
            event!(Level::ERROR, error = %err, "Restart failed after stop");

            return Err(err);
        }

        Ok(())
    }
}
