//! API client configuration.
//!
//! Values come from the environment, falling back to defaults that match a
//! local development server.

use std::time::Duration;

use url::Url;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "OPERADORAS_API_URL";
/// Environment variable holding the request timeout in milliseconds.
pub const API_TIMEOUT_ENV: &str = "OPERADORAS_API_TIMEOUT_MS";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL is not an absolute http(s) URL.
    #[error("invalid API URL {value:?}: {reason}")]
    InvalidUrl {
        /// Rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The timeout is not a positive integer.
    #[error("invalid timeout {0:?}: expected a positive number of milliseconds")]
    InvalidTimeout(String),
}

/// Settings for the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL the API paths are joined onto.
    pub base_url: Url,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl ApiConfig {
    /// Creates the configuration for a local development server.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in defaults; the `Result` comes from URL parsing.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_lookup(|_| None)
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through the given variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(lookup(API_URL_ENV).as_deref().unwrap_or(DEFAULT_API_URL))?;
        let timeout_ms = match lookup(API_TIMEOUT_ENV) {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            base_url,
            timeout_ms,
            user_agent: format!("operadoras/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Replaces the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an absolute http(s) URL.
    pub fn with_base_url(mut self, value: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(value)?;
        Ok(self)
    }

    /// Replaces the timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTimeout` for zero.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(timeout_ms.to_string()));
        }
        self.timeout_ms = timeout_ms;
        Ok(self)
    }

    /// Returns the timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .ok_or_else(|| ConfigError::InvalidTimeout(value.to_string()))
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason,
    };

    let mut url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be used as a base".to_string()));
    }
    // A trailing slash makes joins append instead of replacing the last segment.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
