//! Collector Layer
//!
//! Probe scheduling and execution. One background task sweeps every
//! configured target on a fixed interval, probing them one after another, and
//! hands the aggregated batch to a metrics consumer.
//!
//! # Architecture
//!
//! - [`Prober`]: Core trait for running one probe session against one target
//! - [`IcmpProber`](ping::IcmpProber): ICMP echo implementation
//! - [`IcmpCheckReceiver`]: Owns the sweep loop and its lifecycle
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use icmpcheck::collector::IcmpCheckReceiver;
//! use icmpcheck::collector::ping::IcmpProber;
//! use icmpcheck::config::{ReceiverConfig, Target};
//! use icmpcheck::metrics::LogConsumer;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReceiverConfig::new(Duration::from_secs(30)).with_target(Target::new("1.1.1.1"));
//! let mut receiver = IcmpCheckReceiver::new(config, IcmpProber::new(), LogConsumer)?;
//!
//! let root = CancellationToken::new();
//! receiver.start(&root)?;
//! // ...
//! receiver.shutdown_with_timeout(Duration::from_secs(5)).await?;
//! # Ok(())
//! # }
//! ```

pub mod ping;
mod result;
mod scheduler;
mod traits;

pub use result::{Packet, ProbeResult, Statistics};
pub use scheduler::{
    DEFAULT_SHUTDOWN_TIMEOUT, IcmpCheckReceiver, ReceiverError, ReceiverState, sweep,
};
pub use traits::{ProbeError, Prober};
