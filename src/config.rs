//! Process configuration, read from the environment once at startup.

use rand::RngCore as _;
use std::env;
use std::fmt::Write as _;
use thiserror;
use url::Url;

/// Environment the hub cannot run without
#[derive(Debug, Clone)]
pub struct Config {
    /// `true` lowers the default log filter to `debug`
    pub debug: bool,
    /// Public URL this hub is reachable at; webhooks are registered under it
    pub self_url: Url,
    /// Token the control surface requires in `X-API-KEY`
    pub self_token: String,
    /// Root URL of the Designer Service
    pub service_url: Url,
    /// Token sent to the Designer Service as `Authorization: Token …`
    pub service_token: String,
    /// Connection URL of the scratch store
    pub redis_url: String,
    /// Port the HTTP surface listens on
    pub port: u16,
    /// Webhook secret, regenerated on every process start
    pub telegram_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Environment variable `{0}` is not set")]
    Missing(&'static str),
    #[error("Environment variable `{name}` is invalid: {reason}")]
    Invalid {
        name: &'static str,
        reason: String,
    },
}

fn required(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::Missing(name))
}

fn required_url(name: &'static str) -> Result<Url, Error> {
    Url::parse(&required(name)?).map_err(|err| Error::Invalid {
        name,
        reason: err.to_string(),
    })
}

/// Generates the per-process webhook secret: 64 hex characters
#[must_use]
pub fn generate_telegram_token() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);

    bytes.iter().fold(String::with_capacity(64), |mut token, byte| {
        let _ = write!(token, "{byte:02x}");
        token
    })
}

impl Config {
    /// # Errors
    /// If a required variable is missing or cannot be parsed
    pub fn from_env() -> Result<Self, Error> {
        let port = match env::var("PORT") {
            Ok(port) => port.parse().map_err(|_| Error::Invalid {
                name: "PORT",
                reason: format!("`{port}` isn't a port number"),
            })?,
            Err(_) => 8000,
        };

        Ok(Self {
            debug: env::var("DEBUG").map_or(false, |value| value == "True" || value == "true"),
            self_url: required_url("SELF_URL")?,
            self_token: required("SELF_TOKEN")?,
            service_url: required_url("SERVICE_URL")?,
            service_token: required("SERVICE_TOKEN")?,
            redis_url: required("REDIS_URL")?,
            port,
            telegram_token: generate_telegram_token(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_token_is_64_hex_chars() {
        let token = generate_telegram_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(token, generate_telegram_token());
    }
}
