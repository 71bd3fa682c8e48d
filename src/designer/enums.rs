//! Enumerations of the Designer Service wire format.

use serde::Deserialize;
use strum_macros::{AsRefStr, Display};

/// Kind of the node a connection starts from
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionSourceObjectType {
    Trigger,
    Message,
    MessageKeyboardButton,
    Condition,
    BackgroundTask,
    ApiRequest,
    DatabaseOperation,
}

/// Kind of the node a connection points to
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionTargetObjectType {
    Trigger,
    Message,
    Condition,
    ApiRequest,
    DatabaseOperation,
}

/// HTTP method of an api-request node
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiRequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<ApiRequestMethod> for reqwest::Method {
    fn from(method: ApiRequestMethod) -> Self {
        match method {
            ApiRequestMethod::Get => reqwest::Method::GET,
            ApiRequestMethod::Post => reqwest::Method::POST,
            ApiRequestMethod::Put => reqwest::Method::PUT,
            ApiRequestMethod::Patch => reqwest::Method::PATCH,
            ApiRequestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Kind of keyboard a message node carries
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKeyboardType {
    Default,
    Inline,
    Payment,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
pub enum ConditionPartType {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
}

/// Comparison operator of one condition part
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
pub enum ConditionPartOperator {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
}

/// Combinator folding one part's result into the running result
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
pub enum ConditionPartNextPartOperator {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

/// Interval of a background task, in days
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum BackgroundTaskInterval {
    Day1,
    Day3,
    Day7,
    Day14,
    Day28,
}

impl BackgroundTaskInterval {
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            BackgroundTaskInterval::Day1 => 1,
            BackgroundTaskInterval::Day3 => 3,
            BackgroundTaskInterval::Day7 => 7,
            BackgroundTaskInterval::Day14 => 14,
            BackgroundTaskInterval::Day28 => 28,
        }
    }
}

impl TryFrom<u8> for BackgroundTaskInterval {
    type Error = String;

    fn try_from(days: u8) -> Result<Self, Self::Error> {
        match days {
            1 => Ok(BackgroundTaskInterval::Day1),
            3 => Ok(BackgroundTaskInterval::Day3),
            7 => Ok(BackgroundTaskInterval::Day7),
            14 => Ok(BackgroundTaskInterval::Day14),
            28 => Ok(BackgroundTaskInterval::Day28),
            _ => Err(format!("`{days}` isn't a valid background task interval")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn deserialize_operators() {
        assert_eq!(
            serde_json::from_value::<ConditionPartOperator>(json!(">=")).unwrap(),
            ConditionPartOperator::GreaterOrEqual
        );
        assert_eq!(
            serde_json::from_value::<ConditionPartNextPartOperator>(json!("||")).unwrap(),
            ConditionPartNextPartOperator::Or
        );
    }

    #[test]
    fn deserialize_interval() {
        assert_eq!(
            serde_json::from_value::<BackgroundTaskInterval>(json!(7)).unwrap(),
            BackgroundTaskInterval::Day7
        );
        assert!(serde_json::from_value::<BackgroundTaskInterval>(json!(2)).is_err());
    }

    #[test]
    fn deserialize_target_type() {
        assert_eq!(
            serde_json::from_value::<ConnectionTargetObjectType>(json!("api_request")).unwrap(),
            ConnectionTargetObjectType::ApiRequest
        );
    }
}
