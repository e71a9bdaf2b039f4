//! Client and aggregation configuration.

use crate::{LibraryError, Result};

/// Default Spotify Web API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Environment variable overriding the API root, mostly for test servers.
pub const API_BASE_URL_ENV: &str = "BATON_API_BASE_URL";

/// Unified configuration for the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without trailing slash
    pub base_url: String,
    /// Rate limit retry configuration
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings, with the base URL taken from `BATON_API_BASE_URL` if set.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_BASE_URL_ENV) {
            Ok(url) => Self::default().with_base_url(url),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(LibraryError::Config(format!("{API_BASE_URL_ENV}: {e}"))),
        }
    }

    /// Create config with retries disabled
    pub fn with_retries_disabled() -> Self {
        Self {
            retry: RetryConfig::disabled(),
            ..Self::default()
        }
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(LibraryError::Config(format!(
                "API base URL must be http(s): '{base_url}'"
            )));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    /// Set custom retry configuration
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry = retry_config;
        self
    }
}

/// Configuration for retrying rate limited requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (set to 0 to disable retries)
    pub max_retries: u32,
    /// Base delay for exponential backoff (in seconds)
    pub base_delay: u64,
    /// Maximum delay cap (in seconds)
    pub max_delay: u64,
    /// Whether retries are enabled at all
    pub enabled: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: 1,
            max_delay: 120,
            enabled: true,
        }
    }
}

impl RetryConfig {
    /// Create a config with retries disabled
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            enabled: false,
            ..Self::default()
        }
    }

    /// Create a config with custom retry count
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            enabled: max_retries > 0,
            ..Self::default()
        }
    }

    /// Create a config with custom delays
    pub fn with_delays(base_delay: u64, max_delay: u64) -> Self {
        Self {
            base_delay,
            max_delay,
            ..Self::default()
        }
    }
}

/// Configuration for a library aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// How many playlist track walks may be in flight at once (minimum 1)
    pub concurrency: usize,
    /// Page size hint for the playlist listing (API maximum is 50)
    pub playlist_page_limit: u32,
    /// Page size hint for playlist track listings (API maximum is 100)
    pub track_page_limit: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            playlist_page_limit: 50,
            track_page_limit: 100,
        }
    }
}

impl AggregatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set both page size hints, clamped to what the API accepts.
    pub fn with_page_limits(mut self, playlist_page_limit: u32, track_page_limit: u32) -> Self {
        self.playlist_page_limit = playlist_page_limit.clamp(1, 50);
        self.track_page_limit = track_page_limit.clamp(1, 100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let config = ClientConfig::new()
            .with_base_url("http://127.0.0.1:8080/v1/")
            .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn test_base_url_rejects_non_http() {
        assert!(matches!(
            ClientConfig::new().with_base_url("ftp://example.com"),
            Err(LibraryError::Config(_))
        ));
    }

    #[test]
    fn test_aggregator_config_clamps() {
        let config = AggregatorConfig::new()
            .with_concurrency(0)
            .with_page_limits(500, 0);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.playlist_page_limit, 50);
        assert_eq!(config.track_page_limit, 1);
    }

    #[test]
    fn test_retries_disabled() {
        let config = ClientConfig::with_retries_disabled();
        assert!(!config.retry.enabled);
        assert_eq!(config.retry.max_retries, 0);
    }
}
