use std::time::Duration;

use crate::errors::{WhippyError, WhippyResult};

pub const DEFAULT_API_URL: &str = "https://api.whippy.co/v1";
pub const API_KEY_VAR: &str = "WHIPPY_API_KEY";
pub const API_URL_VAR: &str = "WHIPPY_API_URL";

/// Fixed per-request timeout for calls to the Whippy API.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Process configuration, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// API root without a trailing slash, e.g. `https://api.whippy.co/v1`.
    pub base_url: String,
    pub api_key: String,
}

impl Config {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> WhippyResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(WhippyError::Config(format!(
                "{API_KEY_VAR} environment variable is required"
            )));
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, api_key })
    }

    pub fn from_env() -> WhippyResult<Self> {
        let api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
        let base_url =
            std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let config = Self::new(base_url, api_key)?;
        tracing::info!(api_base = %config.base_url, "config loaded");
        Ok(config)
    }
}
