//! Metrics Layer
//!
//! Uniform time-series representation of probe results:
//! - [`SweepAggregator`]: Turns one sweep's probe results into a [`MetricBatch`]
//! - [`MetricsConsumer`]: Boundary to whatever stores or exports the batches
//!
//! # Series
//!
//! | Name              | Unit | Points                  |
//! |-------------------|------|-------------------------|
//! | `ping.rtt`        | ms   | one per received reply  |
//! | `ping.rtt.min`    | ms   | one per target per sweep |
//! | `ping.rtt.max`    | ms   | one per target per sweep |
//! | `ping.rtt.avg`    | ms   | one per target per sweep |
//! | `ping.rtt.stddev` | ms   | one per target per sweep |
//! | `ping.loss.ratio` |      | one per target per sweep |

mod aggregator;
mod error;
mod sink;
mod types;

pub use aggregator::{SweepAggregator, duration_to_ms};
pub use error::ConsumerError;
pub use sink::{ChannelConsumer, DEFAULT_CHANNEL_CAPACITY, LogConsumer, MetricsConsumer};
pub use types::{
    ATTR_PEER_IP, ATTR_PEER_NAME, Attributes, Metric, MetricBatch, MetricName, NumberDataPoint,
};
