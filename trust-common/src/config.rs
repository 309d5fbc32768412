//! Client configuration
//!
//! The configuration is built once (programmatically or from TOML) and passed
//! into the scoring client at construction. Nothing here reads the process
//! environment; that belongs to the embedding program.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Default remote service root
pub const DEFAULT_BASE_URL: &str = "https://api.pipl.com/trust";
/// Default number of retries after the first attempt (4 tries total)
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default backoff unit; attempt N waits N times this
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
/// Default per-exchange deadline
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default admissions per trailing second
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;
/// Default jitter added to rate-limit waits
pub const DEFAULT_RATE_LIMIT_JITTER_MS: u64 = 10;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive (e.g. "info", "trust_client=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Scoring client configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Credential injected into every outbound payload
    pub api_key: String,
    /// Override for the service root
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Trailing-second admission ceiling; 0 disables rate limiting
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_rate_limit_jitter_ms")]
    pub rate_limit_jitter_ms: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_requests_per_second() -> u32 {
    DEFAULT_REQUESTS_PER_SECOND
}

fn default_rate_limit_jitter_ms() -> u64 {
    DEFAULT_RATE_LIMIT_JITTER_MS
}

impl ClientConfig {
    /// Configuration with defaults for everything except the credential
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            rate_limit_jitter_ms: DEFAULT_RATE_LIMIT_JITTER_MS,
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_requests_per_second(mut self, requests_per_second: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    pub fn with_rate_limit_jitter(mut self, jitter: Duration) -> Self {
        self.rate_limit_jitter_ms = jitter.as_millis() as u64;
        self
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check invariants the client relies on
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("api_key must not be empty".to_string()));
        }

        if let Some(base_url) = &self.base_url {
            let parsed = url::Url::parse(base_url)
                .map_err(|e| Error::Config(format!("base_url {:?} is not a valid URL: {}", base_url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "base_url must be an http(s) URL, got {:?}",
                    base_url
                )));
            }
        }

        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Service root without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn rate_limit_jitter(&self) -> Duration {
        Duration::from_millis(self.rate_limit_jitter_ms)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("timeout_ms", &self.timeout_ms)
            .field("requests_per_second", &self.requests_per_second)
            .field("rate_limit_jitter_ms", &self.rate_limit_jitter_ms)
            .field("logging", &self.logging)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("key123");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ClientConfig::new("k").with_base_url("http://localhost:8080/");
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_validate_rejects_blank_key_and_bad_url() {
        assert!(matches!(ClientConfig::new("  ").validate(), Err(Error::Config(_))));
        assert!(matches!(
            ClientConfig::new("k").with_base_url("ftp://x").validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ClientConfig::new("k").with_timeout(Duration::ZERO).validate(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate_parses_base_url() {
        for bad in ["http://exa mple.com/trust", "http://", "https://[::1/trust"] {
            let err = ClientConfig::new("k").with_base_url(bad).validate().unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{} gave {:?}", bad, err);
        }

        assert!(ClientConfig::new("k")
            .with_base_url("https://trust.internal:8443/v2/")
            .validate()
            .is_ok());
    }
}
