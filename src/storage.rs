//! Per-(bot, chat, user) scratch state, stored as one JSON object per key.
//!
//! Keys are scoped `tbh:{bot_id}[:{chat_id}[:{user_id}]]`. Every write is a
//! read-modify-write of the whole object, and refreshes the expiry so stale
//! entries are dropped by the store itself.

use crate::errors::StorageErrorKind;

use redis::{aio::ConnectionManager, AsyncCommands};
use serde_json::{Map, Value};
use tracing::instrument;

/// Entries not touched for this long are expired by the store
pub const EXPIRY_SECONDS: u64 = 30 * 24 * 60 * 60;

/// One scoped scratch object
#[derive(Clone)]
pub struct Storage {
    connection: ConnectionManager,
    key: String,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

fn build_key(bot_id: i64, chat_id: Option<i64>, user_id: Option<i64>) -> String {
    let mut key = format!("tbh:{bot_id}");

    if let Some(chat_id) = chat_id {
        key.push_str(&format!(":{chat_id}"));
    }
    if let Some(user_id) = user_id {
        key.push_str(&format!(":{user_id}"));
    }

    key
}

impl Storage {
    #[must_use]
    pub fn new(
        connection: ConnectionManager,
        bot_id: i64,
        chat_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Self {
        Self {
            connection,
            key: build_key(bot_id, chat_id, user_id),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn read(&self) -> Result<Map<String, Value>, StorageErrorKind> {
        let mut connection = self.connection.clone();
        let raw_data: Option<String> = connection.get(&self.key).await?;

        let Some(raw_data) = raw_data else {
            return Ok(Map::new());
        };

        match serde_json::from_str(&raw_data)? {
            Value::Object(data) => Ok(data),
            _ => Err(StorageErrorKind::Corrupted {
                key: self.key.as_str().into(),
            }),
        }
    }

    async fn write(&self, data: &Map<String, Value>) -> Result<(), StorageErrorKind> {
        let mut connection = self.connection.clone();

        let _: () = connection
            .set_ex(&self.key, serde_json::to_string(data)?, EXPIRY_SECONDS)
            .await?;

        Ok(())
    }

    /// # Errors
    /// If the store is unreachable or holds a non-object value at this key
    #[instrument(skip(self), fields(storage_key = %self.key))]
    pub async fn get(&self, key: &str) -> Result<Option<Value>, StorageErrorKind> {
        Ok(self.read().await?.get(key).cloned())
    }

    /// Removes `key` from the object and returns its previous value
    /// # Errors
    /// If the store is unreachable or holds a non-object value at this key
    #[instrument(skip(self), fields(storage_key = %self.key))]
    pub async fn pop(&self, key: &str) -> Result<Option<Value>, StorageErrorKind> {
        let mut data = self.read().await?;
        let value = data.remove(key);

        self.write(&data).await?;

        Ok(value)
    }

    /// # Errors
    /// If the store is unreachable or holds a non-object value at this key
    #[instrument(skip(self, value), fields(storage_key = %self.key))]
    pub async fn set(&self, key: &str, value: Value) -> Result<(), StorageErrorKind> {
        let mut data = self.read().await?;
        data.insert(key.to_owned(), value);

        self.write(&data).await
    }

    /// # Errors
    /// If the store is unreachable or holds a non-object value at this key
    #[instrument(skip(self), fields(storage_key = %self.key))]
    pub async fn delete(&self, key: &str) -> Result<(), StorageErrorKind> {
        let mut data = self.read().await?;
        data.remove(key);

        self.write(&data).await
    }
}

/// Scratch handles available for one update.
///
/// An absent handle means the update lacked the corresponding id;
/// handlers skip their scratch interactions in that case.
#[derive(Debug, Clone)]
pub struct EventStorage {
    pub chat: Option<Storage>,
    pub user: Option<Storage>,
}

impl EventStorage {
    #[must_use]
    pub fn new(
        connection: &ConnectionManager,
        bot_id: i64,
        chat_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Self {
        let chat = chat_id.map(|chat_id| Storage::new(connection.clone(), bot_id, Some(chat_id), None));
        let user = match (chat_id, user_id) {
            (Some(chat_id), Some(user_id)) => Some(Storage::new(
                connection.clone(),
                bot_id,
                Some(chat_id),
                Some(user_id),
            )),
            _ => None,
        };

        Self { chat, user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        assert_eq!(build_key(1, None, None), "tbh:1");
        assert_eq!(build_key(1, Some(2), None), "tbh:1:2");
        assert_eq!(build_key(1, Some(2), Some(3)), "tbh:1:2:3");
    }
}
