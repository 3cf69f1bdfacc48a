//! Metric sinks receiving finished sweep batches.

use tokio::sync::mpsc;

use crate::metrics::{ConsumerError, MetricBatch};

/// Default capacity of a [`ChannelConsumer`] queue.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Receives one batch per sweep.
#[async_trait::async_trait]
pub trait MetricsConsumer: Send + Sync + 'static {
    /// Take ownership of a finished batch.
    async fn consume(&self, batch: MetricBatch) -> Result<(), ConsumerError>;
}

/// Forwards batches over a bounded MPSC channel to an embedding application.
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    tx: mpsc::Sender<MetricBatch>,
}

impl ChannelConsumer {
    /// Create a consumer and the receiver its batches arrive on.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MetricBatch>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl MetricsConsumer for ChannelConsumer {
    async fn consume(&self, batch: MetricBatch) -> Result<(), ConsumerError> {
        self.tx
            .send(batch)
            .await
            .map_err(|_| ConsumerError::ChannelClosed)
    }
}

/// Writes every data point as a structured log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConsumer;

#[async_trait::async_trait]
impl MetricsConsumer for LogConsumer {
    async fn consume(&self, batch: MetricBatch) -> Result<(), ConsumerError> {
        tracing::info!(points = batch.data_point_count(), "Metric batch received");

        for metric in batch.metrics() {
            for point in &metric.data_points {
                let attributes = serde_json::to_string(&point.attributes)?;
                tracing::info!(
                    metric = %metric.name,
                    unit = metric.unit.as_deref().unwrap_or(""),
                    value = point.value,
                    timestamp = %point.timestamp.to_rfc3339(),
                    attributes = %attributes,
                    "Data point"
                );
            }
        }
        Ok(())
    }
}
