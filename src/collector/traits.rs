//! Core prober trait and error types.

use crate::collector::ProbeResult;
use crate::config::Target;
use thiserror::Error;

/// Errors that can occur while probing a single target.
///
/// Neither variant is fatal to a sweep: the target is skipped and the sweep
/// moves on to the next one.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The target address could not be resolved to an IP address.
    #[error("failed to resolve '{target}': {source}")]
    Resolution {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The probe session could not run (socket setup, permissions, I/O).
    #[error("failed to probe '{target}': {source}")]
    Execution {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Target the failed probe was aimed at.
    pub fn target(&self) -> &str {
        match self {
            Self::Resolution { target, .. } | Self::Execution { target, .. } => target,
        }
    }

    /// Whether the failure happened during name resolution.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}

/// Runs one bounded probe session against one target.
///
/// # Error Handling
///
/// Packet loss is an observation, not an error: a session in which some or
/// all requests went unanswered still returns `Ok` with a non-zero loss
/// ratio. Only failures that prevent the session as a whole are returned as
/// `Err`. Implementations never retry.
#[async_trait::async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Probe `target` once.
    async fn probe(&self, target: &Target) -> Result<ProbeResult, ProbeError>;
}
