//! Trigger nodes reached *inside* a traversal arm the expected-trigger continuation:
//! the trigger id is remembered in user scratch, and the next matching update resumes
//! from that trigger's connections.

use super::HandlerResult;

use crate::{designer::models::Trigger, storage::EventStorage};

use serde_json::json;

/// Scratch key holding the armed trigger id
pub const EXPECTED_TRIGGER_ID_KEY: &str = "expected_trigger_id";

pub async fn handle(trigger: &Trigger, storage: &EventStorage) -> HandlerResult {
    let Some(user_storage) = &storage.user else {
        return Ok(None);
    };

    user_storage
        .set(EXPECTED_TRIGGER_ID_KEY, json!(trigger.id))
        .await?;

    // Terminal: the continuation fires on a later update
    Ok(None)
}
