//! Configuration types for the bgpstuff client
//!
//! Default values are public constants. The base URL can additionally be
//! overridden at runtime through the `BGPSTUFF_URL` environment variable.

use std::time::Duration;

/// Default bgpstuff.net instance
pub const DEFAULT_BASE_URL: &str = "https://bgpstuff.net";
/// Environment variable that overrides [`DEFAULT_BASE_URL`]
pub const BASE_URL_ENV: &str = "BGPSTUFF_URL";
/// Default number of requests allowed per rate-limit window
pub const DEFAULT_RATE_LIMIT_CALLS: usize = 30;
/// Default rate-limit window
pub const DEFAULT_RATE_LIMIT_PERIOD: Duration = Duration::from_secs(60);
/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent sent with every request
pub fn default_user_agent() -> String {
    format!("bgpstuff-rs/{}", env!("CARGO_PKG_VERSION"))
}

/// Base URL to use when none is configured explicitly
pub fn default_base_url() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Configuration for a [`Client`](crate::Client)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the bgpstuff instance, without a trailing slash
    pub base_url: String,
    /// Maximum requests per rate-limit window (default: 30)
    pub rate_limit_calls: usize,
    /// Length of the rate-limit window (default: 60s)
    pub rate_limit_period: Duration,
    /// Timeout for each HTTP request (default: 10s)
    pub request_timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            rate_limit_calls: DEFAULT_RATE_LIMIT_CALLS,
            rate_limit_period: DEFAULT_RATE_LIMIT_PERIOD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            ));
        }
        if self.rate_limit_calls == 0 {
            return Err("rate_limit_calls must be at least 1".to_string());
        }
        if self.rate_limit_period.is_zero() {
            return Err("rate_limit_period must be greater than 0".to_string());
        }
        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Builder for ClientConfig
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the base URL; trailing slashes are stripped
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the number of requests allowed per window
    pub fn rate_limit_calls(mut self, calls: usize) -> Self {
        self.config.rate_limit_calls = calls;
        self
    }

    /// Set the rate-limit window length
    pub fn rate_limit_period(mut self, period: Duration) -> Self {
        self.config.rate_limit_period = period;
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the User-Agent header value
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ClientConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
