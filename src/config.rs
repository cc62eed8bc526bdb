//! Environment configuration

use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CHAT_URL: &str = "http://localhost:5678/webhook/chat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Raw configuration as read from the environment
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    /// Webhook endpoint (`CHAT_URL`)
    pub chat_url: Option<String>,
    /// Request timeout in seconds (`CHAT_TIMEOUT_SECS`)
    pub timeout_secs: Option<String>,
}

/// Validated settings the transport is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub endpoint: Url,
    pub timeout: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid CHAT_URL {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("Invalid CHAT_TIMEOUT_SECS {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self {
            chat_url: std::env::var("CHAT_URL").ok(),
            timeout_secs: std::env::var("CHAT_TIMEOUT_SECS").ok(),
        }
    }

    pub fn validate(&self) -> Result<ChatSettings, ConfigError> {
        let raw_url = self
            .chat_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CHAT_URL);

        let endpoint = Url::parse(raw_url).map_err(|e| ConfigError::InvalidEndpoint {
            url: raw_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                url: raw_url.to_string(),
                reason: format!("unsupported scheme {}", endpoint.scheme()),
            });
        }

        let timeout = match self.timeout_secs.as_deref().map(str::trim) {
            None | Some("") => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw.to_string())),
            },
        };

        Ok(ChatSettings { endpoint, timeout })
    }
}
