//! Receiver and target configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::validation::{ConfigError, ensure_positive, expand_env_vars};

// =============================================================================
// Constants
// =============================================================================

/// Default time between sweeps (1 minute).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default number of echo requests per probe session.
pub const DEFAULT_PING_COUNT: u16 = 3;

/// Default budget for a whole probe session (5 seconds).
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Default spacing between echo requests of one session (1 second).
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(1);

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

// =============================================================================
// Target Configuration
// =============================================================================

/// One probe destination.
///
/// The overrides are optional; the accessors fall back to the defaults, so an
/// absent value is never read as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Hostname or IP address, resolved at probe time.
    #[serde(rename = "target")]
    pub address: String,

    /// Number of echo requests (default: 3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_count: Option<u16>,

    /// Budget for the whole session (default: 5s).
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub ping_timeout: Option<Duration>,

    /// Spacing between echo requests (default: 1s).
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub ping_interval: Option<Duration>,
}

impl Target {
    /// Create a target with no overrides.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ping_count: None,
            ping_timeout: None,
            ping_interval: None,
        }
    }

    /// Override the number of echo requests.
    pub fn with_ping_count(mut self, count: u16) -> Self {
        self.ping_count = Some(count);
        self
    }

    /// Override the session timeout.
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = Some(timeout);
        self
    }

    /// Override the request spacing.
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = Some(interval);
        self
    }

    /// Effective number of echo requests.
    pub fn ping_count(&self) -> u16 {
        self.ping_count.unwrap_or(DEFAULT_PING_COUNT)
    }

    /// Effective session timeout.
    pub fn ping_timeout(&self) -> Duration {
        self.ping_timeout.unwrap_or(DEFAULT_PING_TIMEOUT)
    }

    /// Effective request spacing.
    pub fn ping_interval(&self) -> Duration {
        self.ping_interval.unwrap_or(DEFAULT_PING_INTERVAL)
    }

    /// Validate the explicit overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "target address cannot be empty".to_string(),
            ));
        }
        if self.ping_count == Some(0) {
            return Err(ConfigError::ValidationError(format!(
                "target '{}': ping_count must be at least 1",
                self.address
            )));
        }
        if let Some(timeout) = self.ping_timeout {
            ensure_positive(&format!("target '{}': ping_timeout", self.address), timeout)?;
        }
        if let Some(interval) = self.ping_interval {
            ensure_positive(&format!("target '{}': ping_interval", self.address), interval)?;
        }
        Ok(())
    }
}

// =============================================================================
// Receiver Configuration
// =============================================================================

/// Top-level receiver configuration, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Time between sweeps (default: 1m).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Probe destinations, swept in this order.
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            targets: Vec::new(),
        }
    }
}

impl ReceiverConfig {
    /// Create a configuration with the given sweep interval and no targets.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            targets: Vec::new(),
        }
    }

    /// Append a target.
    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` references are expanded before parsing.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(&expand_env_vars(content))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("interval", self.interval)?;
        for target in &self.targets {
            target.validate()?;
        }
        Ok(())
    }
}
