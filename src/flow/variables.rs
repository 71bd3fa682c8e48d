//! The per-traversal variables bag and `{{ … }}` template expansion.
//!
//! Lookup keys may be `.`-separated paths: the `SELF` prefix resolves designer-named
//! variables, the `DATABASE` prefix resolves database records by data path, and any
//! other prefix walks nested containers already present in the bag.

use crate::{
    designer::Api,
    types::{Message, User},
    utils::clean_html,
};

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::{collections::HashMap, sync::Arc};
use tracing::{event, Level};

static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{\{\s*(\w+(?:(?:\.|\s+)\w+)*)\s*\}\}").expect("Invalid variable pattern")
});

/// A scalar parsed out of expanded text, used by condition evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view of the scalar; booleans count as `0`/`1`, text has none
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Bool(value) => Some(f64::from(u8::from(*value))),
            Scalar::Int(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            Scalar::Text(_) => None,
        }
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Scalar::Text(_))
    }

    /// Mixed-type equality: text compares to text only, everything else compares numerically
    #[must_use]
    pub fn loose_eq(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Text(first), Scalar::Text(second)) => first == second,
            (first, second) => match (first.as_number(), second.as_number()) {
                (Some(first), Some(second)) => first == second,
                _ => false,
            },
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(value) => Value::Bool(value),
            Scalar::Int(value) => json!(value),
            Scalar::Float(value) => json!(value),
            Scalar::Text(value) => Value::String(value),
        }
    }
}

/// Parses text to the first matching of bool, integer, float; falls back to the text itself
#[must_use]
pub fn deserialize_text(text: &str) -> Scalar {
    if text.eq_ignore_ascii_case("true") {
        return Scalar::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Scalar::Bool(false);
    }
    if let Ok(value) = text.parse::<i64>() {
        return Scalar::Int(value);
    }
    if let Ok(value) = text.parse::<f64>() {
        return Scalar::Float(value);
    }

    Scalar::Text(text.to_owned())
}

/// The per-traversal mapping of names to values.
///
/// Forking is a shallow copy of the bag: sibling branches never observe
/// each other's added variables.
#[derive(Debug, Clone)]
pub struct Variables {
    api: Arc<Api>,
    store: HashMap<String, Value>,
}

impl Variables {
    /// Seeds the bag with bot identity and, when present, user and message facts
    #[must_use]
    pub fn new(api: Arc<Api>, me: &User, user: Option<&User>, message: Option<&Message>) -> Self {
        let mut store = HashMap::from([
            ("BOT_NAME".to_owned(), json!(me.full_name())),
            ("BOT_USERNAME".to_owned(), json!(me.username)),
        ]);

        if let Some(user) = user {
            store.extend([
                ("USER_ID".to_owned(), json!(user.id)),
                ("USER_USERNAME".to_owned(), json!(user.username)),
                ("USER_FIRST_NAME".to_owned(), json!(user.first_name)),
                ("USER_LAST_NAME".to_owned(), json!(user.last_name)),
                ("USER_FULL_NAME".to_owned(), json!(user.full_name())),
                ("USER_LANGUAGE_CODE".to_owned(), json!(user.language_code)),
            ]);
        }
        if let Some(message) = message {
            store.extend([
                ("USER_MESSAGE_ID".to_owned(), json!(message.id)),
                ("USER_MESSAGE_TEXT".to_owned(), json!(message.text)),
                ("USER_MESSAGE_DATE".to_owned(), json!(message.date)),
            ]);
        }

        Self { api, store }
    }

    /// Adds a named entry to this bag only; forks made earlier are unaffected
    pub fn add(&mut self, key: impl Into<String>, value: Value) {
        self.store.insert(key.into(), value);
    }

    /// Looks up `key`, resolving `SELF.`/`DATABASE.` prefixes and nested paths.
    /// # Returns
    /// `None` when the key is unknown; expansion leaves such markers literal
    pub async fn get(&self, key: &str) -> Option<Value> {
        let (prefix, nested_key) = match key.split_once('.') {
            Some((prefix, nested_key)) => (prefix, Some(nested_key)),
            None => (key, None),
        };

        if prefix == "SELF" {
            return self.get_self_variable(nested_key?).await;
        }
        if prefix == "DATABASE" {
            return self.get_database_record(nested_key?).await;
        }

        if let Some(nested_key) = nested_key {
            if let Some(value) = self.store.get(prefix) {
                if value.is_object() || value.is_array() {
                    return resolve_data_path(value, nested_key);
                }
            }
        }

        self.store.get(key).cloned()
    }

    async fn get_self_variable(&self, name: &str) -> Option<Value> {
        let variables = self
            .api
            .get_variables(name)
            .await
            .map_err(|err| {
                event!(Level::WARN, error = %err, name, "Cannot fetch designer variable");
            })
            .ok()?;

        variables
            .first()
            .map(|variable| Value::String(clean_html(&variable.value)))
    }

    async fn get_database_record(&self, path: &str) -> Option<Value> {
        let records = self
            .api
            .get_database_records(path)
            .await
            .map_err(|err| {
                event!(Level::WARN, error = %err, path, "Cannot fetch database records");
            })
            .ok()?;

        resolve_data_path(&records.first()?.data, path)
    }
}

/// Walks a `.`-separated path through JSON data; numeric segments index arrays
fn resolve_data_path(data: &Value, path: &str) -> Option<Value> {
    let mut current = data;

    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(index) => current.as_array()?.get(index)?,
            Err(_) => current.as_object()?.get(part)?,
        };
    }

    Some(current.clone())
}

/// Renders a resolved value into expanded text
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        // An explicit null reads as a missing variable; the marker stays literal
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(value) => Some(value.to_string()),
        Value::Number(value) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

/// Expands every `{{ NAME }}` marker in `text`.
///
/// All lookups run concurrently; markers whose key resolves to nothing are left literal.
pub async fn replace_text_variables(text: &str, variables: &Variables) -> String {
    let matches: Vec<_> = VARIABLE_PATTERN.captures_iter(text).collect();

    if matches.is_empty() {
        return text.to_owned();
    }

    let values = join_all(
        matches
            .iter()
            .map(|capture| variables.get(capture.get(1).expect("Key group is missing").as_str())),
    )
    .await;

    let mut result = String::with_capacity(text.len());
    let mut last_end_index = 0;

    for (capture, value) in matches.iter().zip(values) {
        let marker = capture.get(0).expect("Whole match is missing");

        result.push_str(&text[last_end_index..marker.start()]);
        match value.as_ref().and_then(value_to_text) {
            Some(value) => result.push_str(&value),
            None => result.push_str(marker.as_str()),
        }
        last_end_index = marker.end();
    }
    result.push_str(&text[last_end_index..]);

    result
}

/// Expands markers in a JSON value, recursing into containers.
///
/// Object keys are expanded as well. With `deserialize`, a fully-expanded string is
/// converted back to bool/int/float when it parses as one.
pub fn replace_data_variables<'a>(
    data: &'a Value,
    variables: &'a Variables,
    deserialize: bool,
) -> futures::future::BoxFuture<'a, Value> {
    use futures::FutureExt as _;

    async move {
        match data {
            Value::String(text) => {
                let expanded = replace_text_variables(text, variables).await;

                if deserialize {
                    Value::from(deserialize_text(&expanded))
                } else {
                    Value::String(expanded)
                }
            }
            Value::Array(items) => Value::Array(
                join_all(
                    items
                        .iter()
                        .map(|item| replace_data_variables(item, variables, deserialize)),
                )
                .await,
            ),
            Value::Object(entries) => {
                let keys = join_all(
                    entries
                        .keys()
                        .map(|key| replace_text_variables(key, variables)),
                );
                let values = join_all(
                    entries
                        .values()
                        .map(|value| replace_data_variables(value, variables, deserialize)),
                );
                let (keys, values) = futures::join!(keys, values);

                Value::Object(keys.into_iter().zip(values).collect::<Map<_, _>>())
            }
            _ => data.clone(),
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    use url::Url;

    fn variables() -> Variables {
        let api = Arc::new(Api::new(
            &Url::parse("http://designer.test").unwrap(),
            "token",
            1,
        ));
        let me = User::new(1, true, "Test Bot");

        Variables::new(api, &me, None, None)
    }

    #[tokio::test]
    async fn expansion_replaces_known_keys() {
        let mut variables = variables();
        variables.add("NAME", json!("Ada"));

        assert_eq!(
            replace_text_variables("Hello, {{ NAME }}!", &variables).await,
            "Hello, Ada!"
        );
        assert_eq!(
            replace_text_variables("Hello, {{name}}!", &variables).await,
            "Hello, Ada!"
        );
    }

    #[tokio::test]
    async fn expansion_leaves_unknown_keys_literal() {
        let variables = variables();

        assert_eq!(
            replace_text_variables("{{ MISSING }} stays", &variables).await,
            "{{ MISSING }} stays"
        );
    }

    #[tokio::test]
    async fn expansion_is_idempotent_without_markers_in_values() {
        let mut variables = variables();
        variables.add("X", json!("7"));

        let text = "value is {{X}} and {{ MISSING }}";
        let once = replace_text_variables(text, &variables).await;
        let twice = replace_text_variables(&once, &variables).await;

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn nested_paths_walk_containers() {
        let mut variables = variables();
        variables.add("API_RESPONSE", json!({"n": 7, "items": [1, 2, 3]}));

        assert_eq!(variables.get("API_RESPONSE.n").await, Some(json!(7)));
        assert_eq!(variables.get("API_RESPONSE.items.1").await, Some(json!(2)));
        assert_eq!(variables.get("API_RESPONSE.missing").await, None);
    }

    #[tokio::test]
    async fn forks_are_independent() {
        let mut parent = variables();
        parent.add("SHARED", json!(1));

        let mut first = parent.clone();
        let mut second = parent.clone();
        first.add("FIRST", json!(1));
        second.add("SECOND", json!(2));

        assert_eq!(first.get("SHARED").await, Some(json!(1)));
        assert_eq!(first.get("SECOND").await, None);
        assert_eq!(second.get("FIRST").await, None);
    }

    #[tokio::test]
    async fn data_expansion_recurses_and_deserializes() {
        let mut variables = variables();
        variables.add("X", json!("7"));

        let data = json!({"count": "{{X}}", "nested": ["{{X}}", "text"]});
        let expanded = replace_data_variables(&data, &variables, true).await;

        assert_eq!(expanded, json!({"count": 7, "nested": [7, "text"]}));
    }

    #[test]
    fn scalars() {
        assert_eq!(deserialize_text("TRUE"), Scalar::Bool(true));
        assert_eq!(deserialize_text("42"), Scalar::Int(42));
        assert_eq!(deserialize_text("4.5"), Scalar::Float(4.5));
        assert_eq!(deserialize_text("abc"), Scalar::Text("abc".to_owned()));

        assert!(Scalar::Int(1).loose_eq(&Scalar::Float(1.0)));
        assert!(Scalar::Bool(true).loose_eq(&Scalar::Int(1)));
        assert!(!Scalar::Text("1".to_owned()).loose_eq(&Scalar::Int(1)));
    }
}
