//! Flow entities as returned by the Designer Service.
//!
//! Every struct here is an immutable snapshot: a traversal never mutates one,
//! conditional branches fork the variables bag instead.

use super::enums::{
    ApiRequestMethod, BackgroundTaskInterval, ConditionPartNextPartOperator, ConditionPartOperator,
    ConditionPartType, ConnectionSourceObjectType, ConnectionTargetObjectType, MessageKeyboardType,
};

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// The designer-side bot record, carrying its privacy flag
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bot {
    pub id: i64,
    pub is_private: bool,
}

/// A typed directed edge between two flow nodes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Connection {
    pub id: i64,
    pub source_object_type: ConnectionSourceObjectType,
    pub source_object_id: i64,
    pub target_object_type: ConnectionTargetObjectType,
    pub target_object_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerCommand {
    pub command: String,
    pub payload: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerMessage {
    /// `None` matches any message text
    pub text: Option<String>,
}

/// Entry point of a flow, matched against incoming updates
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trigger {
    pub id: i64,
    pub command: Option<TriggerCommand>,
    pub message: Option<TriggerMessage>,
    pub source_connections: Vec<Connection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MessageSettings {
    pub reply_to_user_message: bool,
    pub delete_user_message: bool,
    pub send_as_new_message: bool,
}

/// A designer-hosted media file attached to a message node
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageMedia {
    pub id: i64,
    pub position: i64,
    pub name: Option<String>,
    pub size: Option<i64>,
    pub url: Option<String>,
    pub from_url: Option<String>,
}

impl MessageMedia {
    /// The designer-relative URL the file is served from
    #[must_use]
    pub fn any_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.from_url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageKeyboardButton {
    pub id: i64,
    pub row: i64,
    pub position: i64,
    pub text: String,
    pub url: Option<String>,
    pub source_connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageKeyboard {
    #[serde(rename = "type")]
    pub keyboard_type: MessageKeyboardType,
    pub buttons: Vec<MessageKeyboardButton>,
}

/// A reply composed and sent when the node fires
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub settings: MessageSettings,
    pub images: Vec<MessageMedia>,
    pub documents: Vec<MessageMedia>,
    pub keyboard: Option<MessageKeyboard>,
    pub source_connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionPart {
    pub id: i64,
    #[serde(rename = "type")]
    pub part_type: ConditionPartType,
    pub first_value: String,
    pub operator: ConditionPartOperator,
    pub second_value: String,
    pub next_part_operator: Option<ConditionPartNextPartOperator>,
}

/// A branch gate, evaluated left-to-right over its parts
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub parts: Vec<ConditionPart>,
    pub source_connections: Vec<Connection>,
}

/// A scheduled synthetic-update source
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackgroundTask {
    pub id: i64,
    pub interval: BackgroundTaskInterval,
    pub source_connections: Vec<Connection>,
}

/// An outbound HTTP call node
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiRequest {
    pub id: i64,
    pub url: String,
    pub method: ApiRequestMethod,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<Value>,
    pub source_connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseCreateOperation {
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseUpdateOperation {
    pub overwrite: bool,
    pub lookup_field_name: String,
    pub lookup_field_value: String,
    pub create_if_not_found: bool,
    pub new_data: Value,
}

/// A record create/update node; exactly one operation is expected to be set
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseOperation {
    pub id: i64,
    pub create_operation: Option<DatabaseCreateOperation>,
    pub update_operation: Option<DatabaseUpdateOperation>,
    pub source_connections: Vec<Connection>,
}

/// A designer-named variable with author-written HTML value
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Variable {
    pub id: i64,
    pub name: String,
    pub value: String,
}

/// The designer-side record of a platform user
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub full_name: String,
    pub is_allowed: bool,
    pub is_blocked: bool,
}

/// Free-form JSON record of the bot's database
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseRecord {
    pub id: i64,
    pub data: Value,
}
