//! Configuration for the ICMP check receiver.
//!
//! YAML-based loading and validation of:
//! - The sweep interval
//! - The ordered list of probe targets with optional per-target overrides

mod app;
mod validation;

pub use app::{ReceiverConfig, Target};
pub use validation::{ConfigError, expand_env_vars, parse_interval};

pub use app::{DEFAULT_INTERVAL, DEFAULT_PING_COUNT, DEFAULT_PING_INTERVAL, DEFAULT_PING_TIMEOUT};
