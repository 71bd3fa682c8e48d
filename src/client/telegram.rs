//! This module contains the [`APIServer`] struct, which represents the configuration of the Telegram Bot API server.
//!
//! You can use the global variable [`PRODUCTION`] for the default configuration of the
//! Telegram Bot API server.

use once_cell::sync::Lazy;

/// Configuration of Telegram Bot API server endpoints
#[derive(Debug, Clone)]
pub struct APIServer {
    /// Base URL for API
    base_url: Box<str>,
}

impl APIServer {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').into(),
        }
    }

    /// Get base URL for API
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate URL for the given method of the Telegram Bot API
    #[must_use]
    pub fn api_url(&self, token: &str, method_name: &str) -> String {
        format!("{base_url}/bot{token}/{method_name}", base_url = self.base_url)
    }
}

pub static PRODUCTION: Lazy<APIServer> = Lazy::new(|| APIServer::new("https://api.telegram.org"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url() {
        assert_eq!(
            PRODUCTION.api_url("123:ABC", "getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }
}
