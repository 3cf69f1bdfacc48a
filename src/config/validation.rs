//! Parsing and validation helpers shared by the configuration types.

use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use thiserror::Error;

/// Configuration error types.
///
/// Any of these is fatal at startup: a receiver is never built from a
/// configuration that failed to load or validate.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Parse the `--interval` command-line override.
///
/// Accepts the same humantime syntax as the config file (`30s`, `1m`,
/// `1m30s`) and rejects zero, so an override can never yield an interval the
/// config validation would refuse.
///
/// # Examples
///
/// ```
/// use icmpcheck::config::parse_interval;
///
/// assert_eq!(parse_interval("30s").unwrap().as_secs(), 30);
/// assert_eq!(parse_interval("1m30s").unwrap().as_secs(), 90);
/// assert!(parse_interval("0s").is_err());
/// ```
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    match humantime::parse_duration(s.trim()) {
        Ok(d) if d.is_zero() => Err("sweep interval must be greater than zero".to_string()),
        Ok(d) => Ok(d),
        Err(e) => Err(format!("invalid sweep interval '{s}': {e}")),
    }
}

/// Reject zero durations for the named field.
pub(crate) fn ensure_positive(field: &str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(())
}

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?::-(?P<default>[^}]*))?\}")
        .expect("env reference pattern is a valid regex")
});

/// Substitute `${VAR}` and `${VAR:-default}` references in the config file
/// text before it is parsed, e.g. `target: ${ICMPCHECK_GATEWAY:-192.168.1.1}`.
///
/// Unset variables without a default become empty, which then fails
/// validation for required fields such as `target`.
pub fn expand_env_vars(input: &str) -> String {
    ENV_REF
        .replace_all(input, |caps: &Captures| {
            std::env::var(&caps["name"]).unwrap_or_else(|_| {
                caps.name("default")
                    .map_or_else(String::new, |m| m.as_str().to_string())
            })
        })
        .into_owned()
}
