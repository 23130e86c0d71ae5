//! Remote API configuration.
//!
//! # Responsibility
//! - Validate the base URL and request timeout of the remote API.
//! - Load both from environment variables when requested.
//!
//! # Invariants
//! - `base_url` is non-empty, uses `http` or `https`, and has no trailing slash.
//! - `timeout` is greater than zero.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "TWIN_API_BASE_URL";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_SECS_ENV: &str = "TWIN_API_TIMEOUT_SECS";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingBaseUrl,
    InvalidBaseUrl(String),
    InvalidTimeout(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBaseUrl => write!(f, "api base url is missing ({BASE_URL_ENV})"),
            Self::InvalidBaseUrl(value) => {
                write!(f, "api base url must start with http:// or https://: {value}")
            }
            Self::InvalidTimeout(value) => {
                write!(f, "api timeout must be a positive number of seconds: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Validated remote API settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    /// Builds a config with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(format!("{}", timeout.as_secs())));
        }
        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            timeout,
        })
    }

    /// Reads `TWIN_API_BASE_URL` and the optional `TWIN_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_ENV).ok_or(ConfigError::MissingBaseUrl)?;
        let timeout = match lookup(TIMEOUT_SECS_ENV) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT,
        };
        Self::with_timeout(base_url, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }
    let has_host = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.len() > scheme.len() && trimmed.starts_with(scheme));
    if !has_host {
        return Err(ConfigError::InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
