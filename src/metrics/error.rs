//! Metric sink error types.

use thiserror::Error;

/// Errors a [`MetricsConsumer`](super::MetricsConsumer) may report.
///
/// The receiver logs these and drops the batch; it never retries.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The receiving side of the channel is gone.
    #[error("metrics channel closed")]
    ChannelClosed,

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The consumer refused the batch.
    #[error("batch rejected: {0}")]
    Rejected(String),
}
