//! Configuration module
//!
//! Client configuration is read from the environment (and a `.env` file when
//! present). All variables use the `BORDEREAU_` prefix.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_QUEUE_POLL_INTERVAL_SECS, DEFAULT_REJECTED_POLL_INTERVAL_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Scan client configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Sent as `Authorization: Bearer {token}`. Takes precedence over `api_key`.
    pub api_token: Option<String>,
    /// Sent as `X-API-Key: {key}`
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub queue_poll_interval_secs: u64,
    pub rejected_poll_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            api_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            queue_poll_interval_secs: DEFAULT_QUEUE_POLL_INTERVAL_SECS,
            rejected_poll_interval_secs: DEFAULT_REJECTED_POLL_INTERVAL_SECS,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment:
    ///
    /// - `BORDEREAU_API_URL` (or `API_URL`)
    /// - `BORDEREAU_API_TOKEN` (or `JWT_TOKEN`)
    /// - `BORDEREAU_API_KEY`
    /// - `BORDEREAU_REQUEST_TIMEOUT_SECS`
    /// - `BORDEREAU_QUEUE_POLL_INTERVAL_SECS`
    /// - `BORDEREAU_REJECTED_POLL_INTERVAL_SECS`
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. `from_env` delegates here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("BORDEREAU_API_URL")
            .or_else(|| non_empty("API_URL"))
            .unwrap_or(defaults.api_url);

        let parse_secs = |key: &str, default: u64| -> Result<u64, anyhow::Error> {
            match non_empty(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| anyhow::anyhow!("{} must be a number of seconds: {}", key, e)),
                None => Ok(default),
            }
        };

        let config = Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token: non_empty("BORDEREAU_API_TOKEN").or_else(|| non_empty("JWT_TOKEN")),
            api_key: non_empty("BORDEREAU_API_KEY"),
            request_timeout_secs: parse_secs(
                "BORDEREAU_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            queue_poll_interval_secs: parse_secs(
                "BORDEREAU_QUEUE_POLL_INTERVAL_SECS",
                defaults.queue_poll_interval_secs,
            )?,
            rejected_poll_interval_secs: parse_secs(
                "BORDEREAU_REJECTED_POLL_INTERVAL_SECS",
                defaults.rejected_poll_interval_secs,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.api_url.trim().is_empty() {
            return Err(anyhow::anyhow!("BORDEREAU_API_URL cannot be empty"));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "BORDEREAU_API_URL must start with http:// or https://, got {}",
                self.api_url
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("BORDEREAU_REQUEST_TIMEOUT_SECS must be > 0"));
        }
        if self.queue_poll_interval_secs == 0 || self.rejected_poll_interval_secs == 0 {
            return Err(anyhow::anyhow!("Poll intervals must be > 0"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn queue_poll_interval(&self) -> Duration {
        Duration::from_secs(self.queue_poll_interval_secs)
    }

    pub fn rejected_poll_interval(&self) -> Duration {
        Duration::from_secs(self.rejected_poll_interval_secs)
    }
}
