//! icmpcheck - ICMP Reachability Receiver
//!
//! Periodically pings a configured list of hosts and reports round-trip
//! time and packet loss as time-series metrics. It can be embedded as a
//! library or run as a standalone binary with the `icmpcheck` executable.
//!
//! # Architecture
//!
//! - **Config**: YAML receiver configuration with per-target overrides
//! - **Collector**: ICMP echo prober and the sweep scheduler
//! - **Metrics**: Metric model, per-sweep aggregation and consumers
//!
//! # Example
//!
//! ```rust,no_run
//! use icmpcheck::{ChannelConsumer, IcmpCheckReceiver, IcmpProber, ReceiverConfig, Target};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReceiverConfig::new(Duration::from_secs(30))
//!         .with_target(Target::new("192.0.2.1"));
//!     let (consumer, mut batches) = ChannelConsumer::new(16);
//!
//!     let mut receiver = IcmpCheckReceiver::new(config, IcmpProber::new(), consumer)?;
//!     receiver.start(&CancellationToken::new())?;
//!
//!     while let Some(batch) = batches.recv().await {
//!         println!("{} points", batch.data_point_count());
//!     }
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod config;
pub mod metrics;

pub use collector::ping::IcmpProber;
pub use collector::{
    DEFAULT_SHUTDOWN_TIMEOUT, IcmpCheckReceiver, Packet, ProbeError, ProbeResult, Prober,
    ReceiverError, ReceiverState, Statistics,
};
pub use config::{ConfigError, ReceiverConfig, Target};
pub use metrics::{
    ChannelConsumer, ConsumerError, LogConsumer, Metric, MetricBatch, MetricName,
    MetricsConsumer, NumberDataPoint,
};
