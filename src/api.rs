//! The HTTP surface of the hub: the authenticated control plane
//! (`/bots/…`) and the webhook ingress (`/telegram/bots/…/webhook/`).
//!
//! Control-plane requests authenticate with `X-API-KEY`; webhook requests carry the
//! per-process secret in `X-Telegram-Bot-Api-Secret-Token`. Domain failures answer
//! `400` with `{ "code", "detail" }`, auth failures answer `401`.

use crate::{config::Config, errors::HubErrorKind, hub::Hub, types::Update};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{event, Level};

const API_KEY_HEADER: &str = "x-api-key";
const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub config: Arc<Config>,
}

#[derive(Debug, Deserialize)]
pub struct StartBotRequest {
    pub bot_token: String,
}

/// Error surfaced by the HTTP layer
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Hub(HubErrorKind),
}

impl From<HubErrorKind> for ApiError {
    fn from(err: HubErrorKind) -> Self {
        ApiError::Hub(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Hub(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "code": err.code(),
                    "detail": err.to_string(),
                })),
            )
                .into_response(),
        }
    }
}

fn verify_header(headers: &HeaderMap, name: &str, expected: &str) -> Result<(), ApiError> {
    let provided = headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if provided != expected {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}

async fn get_bots(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<i64>>, ApiError> {
    verify_header(&headers, API_KEY_HEADER, &state.config.self_token)?;

    Ok(Json(state.hub.bot_ids().await))
}

async fn start_bot(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<StartBotRequest>,
) -> Result<(), ApiError> {
    verify_header(&headers, API_KEY_HEADER, &state.config.self_token)?;

    state.hub.start_bot(service_id, &request.bot_token).await?;

    Ok(())
}

async fn restart_bot(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    headers: HeaderMap,
) -> Result<(), ApiError> {
    verify_header(&headers, API_KEY_HEADER, &state.config.self_token)?;

    state.hub.restart_bot(service_id).await?;

    Ok(())
}

async fn stop_bot(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    headers: HeaderMap,
) -> Result<(), ApiError> {
    verify_header(&headers, API_KEY_HEADER, &state.config.self_token)?;

    state.hub.stop_bot(service_id).await?;

    Ok(())
}

async fn bot_webhook(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    headers: HeaderMap,
    Json(update): Json<Value>,
) -> Result<(), ApiError> {
    verify_header(
        &headers,
        TELEGRAM_SECRET_HEADER,
        &state.config.telegram_token,
    )?;

    let bot = state.hub.bot(service_id).await?;

    let update: Update = match serde_json::from_value(update) {
        Ok(update) => update,
        Err(err) => {
            event!(Level::WARN, error = %err, "Webhook update cannot be parsed, dropping it");

            return Ok(());
        }
    };

    // The platform only needs the acknowledgement; handling continues in the background
    tokio::spawn(async move { bot.feed_webhook_update(update).await });

    Ok(())
}

#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/bots/", get(get_bots))
        .route("/bots/:service_id/start/", post(start_bot))
        .route("/bots/:service_id/restart/", post(restart_bot))
        .route("/bots/:service_id/stop/", post(stop_bot))
        .route("/telegram/bots/:service_id/webhook/", post(bot_webhook))
        .with_state(state)
}
