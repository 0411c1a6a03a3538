//! Client configuration.
//!
//! Read from the process environment (after loading `.env` if present):
//!
//! - `API_BASE_URL` - absolute http(s) URL of the course API (required)
//! - `REQUEST_TIMEOUT_SECS` - transport timeout, non-zero (default: 10)
//!
//! `ClientConfig::global` resolves this once per process; later changes to
//! the environment are not observed.

use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

static GLOBAL: OnceLock<ClientConfig> = OnceLock::new();

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        let config = Self {
            api_base_url: api_base_url.to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Process-wide configuration, read from the environment on first use.
    pub fn global() -> Result<&'static ClientConfig, ConfigError> {
        if let Some(config) = GLOBAL.get() {
            return Ok(config);
        }
        let config = Self::from_env()?;
        Ok(GLOBAL.get_or_init(|| config))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason,
        };
        let url = Url::parse(&self.api_base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme {other:?}"))),
        }
    }
}
