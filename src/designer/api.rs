//! This module contains the [`Api`] client with typed access to the flow objects of one bot.
//!
//! All requests carry the service token and are scoped to a single bot:
//! `{service_url}/api/telegram-bots-hub/telegram-bots/{service_id}/…`.

use super::{
    models::{
        ApiRequest, BackgroundTask, Bot, Condition, DatabaseOperation, DatabaseRecord, Message,
        MessageKeyboardButton, Trigger, User, Variable,
    },
    schemas::{CreateDatabaseRecord, CreateUser, UpdateDatabaseRecords},
};

use crate::errors::DesignerErrorKind;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, ClientBuilder, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_with::skip_serializing_none;
use tracing::{event, instrument, Level};
use url::Url;

/// Filter params accepted by the `triggers` collection
#[skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TriggerFilter<'a> {
    pub command: Option<&'a str>,
    pub command_payload: Option<&'a str>,
    pub has_command: Option<bool>,
    pub has_command_payload: Option<bool>,
    pub has_command_description: Option<bool>,
    pub has_message: Option<bool>,
    /// `false` restricts the fetch to flow entry points; triggers that are themselves
    /// connection targets only fire as expected-trigger continuations
    pub has_target_connections: Option<bool>,
}

/// Typed client of the Designer Service, scoped to one bot
#[derive(Debug, Clone)]
pub struct Api {
    client: Client,
    base_url: Url,
}

impl Api {
    /// # Panics
    /// Panics if the service token contains invalid header characters
    /// or the service URL cannot be extended with the bot path
    #[must_use]
    pub fn new(service_url: &Url, service_token: &str, service_id: i64) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Token {service_token}"))
                .expect("Service token contains invalid header characters"),
        );

        let client = ClientBuilder::new()
            .default_headers(headers)
            .build()
            .expect("Cannot build a designer service client");

        let base_url = service_url
            .join(&format!(
                "/api/telegram-bots-hub/telegram-bots/{service_id}/"
            ))
            .expect("Cannot build a designer service base URL");

        Self { client, base_url }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, DesignerErrorKind> {
        let url = self.base_url.join(path).map_err(|err| {
            event!(Level::ERROR, error = %err, path, "Cannot build a designer service URL");

            err
        })?;

        Ok(self.client.request(method, url))
    }

    async fn send<T>(request: RequestBuilder) -> Result<T, DesignerErrorKind>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(DesignerErrorKind::Status {
                status: status.as_u16(),
                url: response.url().as_str().into(),
            });
        }

        let content = response.text().await?;

        Ok(serde_json::from_str(&content)?)
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_bot(&self) -> Result<Bot, DesignerErrorKind> {
        Self::send(self.request(Method::GET, "./")?).await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self, filter))]
    pub async fn get_triggers(
        &self,
        filter: &TriggerFilter<'_>,
    ) -> Result<Vec<Trigger>, DesignerErrorKind> {
        Self::send(self.request(Method::GET, "triggers/")?.query(filter)).await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_trigger(&self, trigger_id: i64) -> Result<Trigger, DesignerErrorKind> {
        Self::send(self.request(Method::GET, &format!("triggers/{trigger_id}/"))?).await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_message(&self, message_id: i64) -> Result<Message, DesignerErrorKind> {
        Self::send(self.request(Method::GET, &format!("messages/{message_id}/"))?).await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_condition(&self, condition_id: i64) -> Result<Condition, DesignerErrorKind> {
        Self::send(self.request(Method::GET, &format!("conditions/{condition_id}/"))?).await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_api_request(
        &self,
        api_request_id: i64,
    ) -> Result<ApiRequest, DesignerErrorKind> {
        Self::send(self.request(Method::GET, &format!("api-requests/{api_request_id}/"))?).await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_database_operation(
        &self,
        database_operation_id: i64,
    ) -> Result<DatabaseOperation, DesignerErrorKind> {
        Self::send(self.request(
            Method::GET,
            &format!("database-operations/{database_operation_id}/"),
        )?)
        .await
    }

    /// Keyboard buttons looked up by their id, as carried in callback-query data
    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_keyboard_buttons_by_id(
        &self,
        button_id: i64,
    ) -> Result<Vec<MessageKeyboardButton>, DesignerErrorKind> {
        Self::send(
            self.request(Method::GET, "messages/keyboard-buttons/")?
                .query(&[("id", button_id)]),
        )
        .await
    }

    /// Keyboard buttons looked up by their literal text, as typed on a reply keyboard
    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_keyboard_buttons_by_text(
        &self,
        text: &str,
    ) -> Result<Vec<MessageKeyboardButton>, DesignerErrorKind> {
        Self::send(
            self.request(Method::GET, "messages/keyboard-buttons/")?
                .query(&[("text", text)]),
        )
        .await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_background_tasks(&self) -> Result<Vec<BackgroundTask>, DesignerErrorKind> {
        Self::send(self.request(Method::GET, "background-tasks/")?).await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_variables(&self, name: &str) -> Result<Vec<Variable>, DesignerErrorKind> {
        Self::send(
            self.request(Method::GET, "variables/")?
                .query(&[("name", name)]),
        )
        .await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_users(&self) -> Result<Vec<User>, DesignerErrorKind> {
        Self::send(self.request(Method::GET, "users/")?).await
    }

    /// Creates the user or returns the existing record for its `telegram_id`
    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self, data))]
    pub async fn create_user(&self, data: &CreateUser) -> Result<User, DesignerErrorKind> {
        Self::send(self.request(Method::POST, "users/")?.json(data)).await
    }

    /// Database records that contain a value at the given `.`-separated data path
    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self))]
    pub async fn get_database_records(
        &self,
        has_data_path: &str,
    ) -> Result<Vec<DatabaseRecord>, DesignerErrorKind> {
        Self::send(
            self.request(Method::GET, "database-records/")?
                .query(&[("has_data_path", has_data_path)]),
        )
        .await
    }

    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self, data))]
    pub async fn create_database_record(
        &self,
        data: &CreateDatabaseRecord,
    ) -> Result<DatabaseRecord, DesignerErrorKind> {
        Self::send(self.request(Method::POST, "database-records/")?.json(data)).await
    }

    /// Updates every record matching `search`.
    /// # Notes
    /// `partial` selects `PATCH` (merge) over `PUT` (overwrite).
    /// # Errors
    /// If the service cannot be reached or answers with an error status
    #[instrument(skip(self, data))]
    pub async fn update_database_records(
        &self,
        data: &UpdateDatabaseRecords,
        partial: bool,
        search: &str,
    ) -> Result<Vec<DatabaseRecord>, DesignerErrorKind> {
        let method = if partial { Method::PATCH } else { Method::PUT };

        Self::send(
            self.request(method, "database-records/update-many/")?
                .query(&[("search", search)])
                .json(data),
        )
        .await
    }
}
