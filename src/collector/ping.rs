//! Ping prober for measuring reachability and latency via ICMP echo.
//!
//! - [`IcmpProber`]: Resolves a target and runs one bounded echo session
//! - [`IcmpTransport`] / [`EchoSession`]: Seam to the raw ICMP socket layer
//! - [`SurgeTransport`]: Production transport on top of `surge-ping`

mod collector;
mod session;
mod transport;

pub use collector::IcmpProber;
pub use session::{EchoReply, EchoSession, IcmpTransport};
pub use transport::{SurgeSession, SurgeTransport};
