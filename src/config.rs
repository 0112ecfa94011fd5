//! Client configuration
//!
//! `ClientConfig` holds everything a client needs at construction time:
//! the server base URL, the per-second request budget and the timeouts
//! applied to the underlying HTTP client. It can be built in code or
//! loaded from YAML.

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default Ensembl REST server
pub const DEFAULT_SERVER: &str = "http://rest.ensembl.org/";

/// Ensembl REST server for the GRCh37 assembly
pub const GRCH37_SERVER: &str = "http://grch37.rest.ensembl.org/";

/// Default request budget per second
pub const DEFAULT_REQS_PER_SEC: u32 = 15;

/// Longest 429 back-off the client will sit through
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for an Ensembl REST client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST server
    pub server: String,

    /// Maximum number of requests issued per second
    pub reqs_per_sec: u32,

    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Delay assumed when a 429 response carries no `Retry-After` header
    pub default_retry_after_secs: f64,

    /// Headers sent with every request (callers can still override per request)
    pub headers: BTreeMap<String, String>,

    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            reqs_per_sec: DEFAULT_REQS_PER_SEC,
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            default_retry_after_secs: 1.0,
            headers: BTreeMap::new(),
            user_agent: format!("ensembl-rest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a config for the given server and rate
    pub fn new(server: impl Into<String>, reqs_per_sec: u32) -> Self {
        Self {
            server: server.into(),
            reqs_per_sec,
            ..Self::default()
        }
    }

    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a config from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Default retry-after as a `Duration`, clamped to `MAX_RETRY_AFTER`
    pub fn default_retry_after(&self) -> Duration {
        let secs = self
            .default_retry_after_secs
            .clamp(0.0, MAX_RETRY_AFTER.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or_default()
    }

    /// Check that the values are usable
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(Error::invalid_config("server", "must not be empty"));
        }
        url::Url::parse(&self.server)?;
        if self.reqs_per_sec == 0 {
            return Err(Error::invalid_config(
                "reqs_per_sec",
                "must be a positive integer",
            ));
        }
        if self.timeout_ms == 0 {
            return Err(Error::invalid_config("timeout_ms", "must be positive"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(Error::invalid_config(
                "connect_timeout_ms",
                "must be positive",
            ));
        }
        let max_retry_after = MAX_RETRY_AFTER.as_secs_f64();
        if !(0.0..=max_retry_after).contains(&self.default_retry_after_secs) {
            return Err(Error::invalid_config(
                "default_retry_after_secs",
                format!("must be between 0 and {max_retry_after} seconds"),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for `ClientConfig`
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server base URL
    pub fn server(mut self, url: impl Into<String>) -> Self {
        self.config.server = url.into();
        self
    }

    /// Set the per-second request budget
    pub fn reqs_per_sec(mut self, reqs_per_sec: u32) -> Self {
        self.config.reqs_per_sec = reqs_per_sec;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = as_millis(timeout);
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = as_millis(timeout);
        self
    }

    /// Set the delay used when a 429 carries no `Retry-After`
    pub fn default_retry_after(mut self, delay: Duration) -> Self {
        self.config.default_retry_after_secs = delay.as_secs_f64();
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
