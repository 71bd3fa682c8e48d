//! This module contains [`Reqwest`] struct that uses reqwest client to send requests to the Telegram Bot API.
//!
//! # Notes
//!
//! [`Reqwest`] is default implementation of [`Session`] trait in this crate,
//! so it's used by default in [`Bot`] struct and trait methods that has bot as a parameter.
//!
//! This structure is cheap to clone, because it contains only [`reqwest::Client`]
//! which is wrapped in [`Arc`] and [`APIServer`] wrapped in [`Cow`].
//!
//! [`Arc`]: std::sync::Arc
//! [`APIServer`]: crate::client::telegram::APIServer

use super::base::{ClientResponse, Session, DEFAULT_TIMEOUT};

use crate::{
    client::{telegram, Bot},
    methods::TelegramMethod,
};

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::{borrow::Cow, time::Duration};
use tracing::{event, instrument, Level, Span};

#[derive(Debug, Clone)]
pub struct Reqwest {
    client: Client,
    api: Cow<'static, telegram::APIServer>,
}

impl Reqwest {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api: Cow::Borrowed(&telegram::PRODUCTION),
        }
    }

    #[must_use]
    pub fn with_api_server(self, api: impl Into<Cow<'static, telegram::APIServer>>) -> Self {
        Self {
            api: api.into(),
            ..self
        }
    }
}

impl Default for Reqwest {
    /// # Panics
    /// This method panics if the client cannot be created
    #[must_use]
    fn default() -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(Duration::from_secs_f32(DEFAULT_TIMEOUT))
                .build()
                .unwrap(),
            api: Cow::Borrowed(&telegram::PRODUCTION),
        }
    }
}

#[async_trait]
impl Session for Reqwest {
    #[must_use]
    fn api(&self) -> &telegram::APIServer {
        &self.api
    }

    /// Sends a request to the Telegram Bot API and returns a response.
    /// # Arguments
    /// * `bot` - The bot instance
    /// * `method` - The method instance
    /// * `timeout` - The request timeout
    /// # Warning
    /// If the timeout is not set, the default timeout will not be used.
    ///
    /// Uses always `POST` method with a JSON body; the hub never uploads files,
    /// media is passed to Telegram by URL.
    /// # Errors
    /// Returns an error if the request cannot be sent or the response cannot be received.
    #[instrument(skip(self, bot, method, timeout), fields(method_name, timeout))]
    async fn send_request<Client, T>(
        &self,
        bot: &Bot<Client>,
        method: &T,
        timeout: Option<f32>,
    ) -> Result<ClientResponse, anyhow::Error>
    where
        Client: Session,
        T: TelegramMethod + Send + Sync,
        T::Method: Send + Sync,
    {
        let request = method.build_request(bot);

        Span::current().record("method_name", request.method_name);

        let url = self.api.api_url(&bot.token, request.method_name);

        let response = if let Some(timeout) = timeout {
            Span::current().record("timeout", timeout);

            self.client
                .post(url)
                .json(request.data)
                .timeout(Duration::from_secs_f32(timeout))
        } else {
            self.client.post(url).json(request.data)
        }
        .send()
        .await
        .map_err(|err| {
            event!(
                Level::ERROR,
                error = %err,
                "Cannot send a request",
            );

            err
        })?;

        let status_code = response.status().as_u16();

        let content = response.text().await.map_err(|err| {
            event!(
                Level::ERROR,
                error = %err,
                status_code,
                "Cannot get a response content",
            );

            err
        })?;

        Ok(ClientResponse::new(status_code, content))
    }
}
