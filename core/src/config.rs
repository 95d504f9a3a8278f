//! Startup configuration.
//!
//! # Design
//! All settings are read once, at startup, into a `Config` that is then
//! passed to the components that need it. `from_lookup` takes any
//! `name -> value` function so tests never touch the process environment;
//! `from_env` plugs in `std::env::var`. Blank values count as missing.

use std::time::Duration;

use crate::error::ConfigError;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const PRACTICUM_ENDPOINT: &str = "PRACTICUM_ENDPOINT";
pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
pub const RETRY_INTERVAL_SECS: &str = "RETRY_INTERVAL_SECS";
pub const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(600);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated bot configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub practicum_token: String,
    pub telegram_token: String,
    pub chat_id: String,
    pub endpoint: String,
    pub telegram_api_url: String,
    pub retry_interval: Duration,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &"***")
            .field("telegram_token", &"***")
            .field("chat_id", &self.chat_id)
            .field("endpoint", &self.endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("retry_interval", &self.retry_interval)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from `lookup`, reporting every missing required
    /// variable at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let required = [PRACTICUM_TOKEN, TELEGRAM_TOKEN, TELEGRAM_CHAT_ID];
        let missing: Vec<&'static str> = required
            .iter()
            .copied()
            .filter(|name| get(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let secs = |name: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match get(name) {
                None => Ok(default),
                Some(raw) => raw
                    .parse::<u64>()
                    .ok()
                    .filter(|n| *n > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::Invalid { name, value: raw }),
            }
        };

        Ok(Self {
            practicum_token: get(PRACTICUM_TOKEN).unwrap_or_default(),
            telegram_token: get(TELEGRAM_TOKEN).unwrap_or_default(),
            chat_id: get(TELEGRAM_CHAT_ID).unwrap_or_default(),
            endpoint: get(PRACTICUM_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            telegram_api_url: get(TELEGRAM_API_URL)
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            retry_interval: secs(RETRY_INTERVAL_SECS, DEFAULT_RETRY_INTERVAL)?,
            http_timeout: secs(HTTP_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT)?,
        })
    }
}
