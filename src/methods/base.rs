use crate::{client::Bot, types::ResponseParameters};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A request to the Telegram Bot API, built by a [`TelegramMethod`]
#[derive(Debug)]
pub struct Request<'a, T: Serialize + ?Sized> {
    /// API method name, for example `sendMessage`
    pub method_name: &'static str,
    /// Data to be sent as the JSON body of the request
    pub data: &'a T,
}

impl<'a, T: Serialize + ?Sized> Request<'a, T> {
    #[must_use]
    pub const fn new(method_name: &'static str, data: &'a T) -> Self {
        Self { method_name, data }
    }
}

/// Response envelope of the Telegram Bot API
#[derive(Debug, Deserialize)]
pub struct Response<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<Box<str>>,
    pub error_code: Option<i64>,
    pub parameters: Option<ResponseParameters>,
}

/// A method of the Telegram Bot API
pub trait TelegramMethod {
    /// Data structure sent as the request body
    type Method: Serialize;
    /// Data structure returned in the `result` field on success
    type Return: DeserializeOwned;

    #[must_use]
    fn build_request<Client>(&self, bot: &Bot<Client>) -> Request<'_, Self::Method>;

    /// # Errors
    /// If the response content cannot be parsed
    fn build_response(&self, content: &str) -> Result<Response<Self::Return>, serde_json::Error> {
        serde_json::from_str(content)
    }
}
