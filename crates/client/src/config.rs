//! Client configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use nooryx_inventory::DEFAULT_PAGE_SIZE;
use thiserror::Error;

pub const API_URL_ENV: &str = "NOORYX_API_URL";
pub const PAGE_SIZE_ENV: &str = "NOORYX_PAGE_SIZE";
pub const SEARCH_DEBOUNCE_ENV: &str = "NOORYX_SEARCH_DEBOUNCE_MS";
pub const REQUEST_TIMEOUT_ENV: &str = "NOORYX_REQUEST_TIMEOUT_SECS";
pub const URL_SYNC_ENV: &str = "NOORYX_URL_SYNC";
pub const PREFERENCES_PATH_ENV: &str = "NOORYX_PREFERENCES_PATH";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {value}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be {expected}, got {value:?}")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: url::Url,
    pub default_page_size: u32,
    pub search_debounce: Duration,
    pub request_timeout: Duration,
    /// Mirror the list query into a URL query string.
    pub url_sync: bool,
    /// Overrides the platform default preferences file.
    pub preferences_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            default_page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            url_sync: true,
            preferences_path: None,
        }
    }
}

impl ClientConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (unset -> default).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(API_URL_ENV) {
            config.api_url = url::Url::parse(&value).map_err(|_| ConfigError::InvalidUrl {
                var: API_URL_ENV,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(PAGE_SIZE_ENV) {
            config.default_page_size = value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid(PAGE_SIZE_ENV, "a positive integer", &value))?;
        }

        if let Some(value) = lookup(SEARCH_DEBOUNCE_ENV) {
            let ms = value
                .parse::<u64>()
                .map_err(|_| invalid(SEARCH_DEBOUNCE_ENV, "milliseconds", &value))?;
            config.search_debounce = Duration::from_millis(ms);
        }

        if let Some(value) = lookup(REQUEST_TIMEOUT_ENV) {
            let secs = value
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid(REQUEST_TIMEOUT_ENV, "a positive number of seconds", &value))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = lookup(URL_SYNC_ENV) {
            config.url_sync = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid(URL_SYNC_ENV, "a boolean", &value)),
            };
        }

        config.preferences_path = lookup(PREFERENCES_PATH_ENV).map(PathBuf::from);

        Ok(config)
    }
}

fn default_api_url() -> url::Url {
    url::Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| unreachable!("default API URL is valid"))
}

fn invalid(var: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        expected,
        value: value.to_string(),
    }
}
