//! Request payloads the hub writes to the Designer Service.

use serde::Serialize;
use serde_json::Value;

/// Create-or-fetch payload for a platform user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateUser {
    pub telegram_id: i64,
    pub full_name: String,
}

impl CreateUser {
    #[must_use]
    pub fn new(telegram_id: i64, full_name: impl Into<String>) -> Self {
        Self {
            telegram_id,
            full_name: full_name.into(),
        }
    }
}

/// Payload for creating a new database record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDatabaseRecord {
    pub data: Value,
}

/// Payload for updating all database records matching a lookup filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateDatabaseRecords {
    pub data: Value,
}
