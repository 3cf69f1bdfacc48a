//! Owned results of a probe session.

use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// One received echo reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Wall-clock time the reply was observed.
    pub timestamp: DateTime<Utc>,
    /// Time between sending the request and receiving this reply.
    pub rtt: Duration,
    /// Address that answered.
    pub source: IpAddr,
}

/// Session-level summary over every reply of one probe session.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Echo requests actually sent.
    pub packets_sent: u32,
    /// Replies received before the session deadline.
    pub packets_received: u32,
    pub min_rtt: Duration,
    pub max_rtt: Duration,
    pub avg_rtt: Duration,
    /// Population standard deviation.
    pub stddev_rtt: Duration,
    /// `(sent - received) / sent`, in `[0, 1]`.
    pub packet_loss_ratio: f64,
    /// Address the target resolved to.
    pub resolved_address: IpAddr,
    /// Target as configured.
    pub display_address: String,
}

impl Statistics {
    /// Summarize a session from the RTTs of the replies it received.
    ///
    /// RTT fields are zero when nothing was received. A session that sent
    /// nothing counts as fully lost.
    pub fn from_rtts(
        packets_sent: u32,
        rtts: &[Duration],
        resolved_address: IpAddr,
        display_address: impl Into<String>,
    ) -> Self {
        let packets_received = u32::try_from(rtts.len()).unwrap_or(u32::MAX);
        // Duplicate replies must not push the ratio below zero.
        let packets_sent = packets_sent.max(packets_received);

        let packet_loss_ratio = if packets_sent == 0 {
            1.0
        } else {
            f64::from(packets_sent - packets_received) / f64::from(packets_sent)
        };

        let (min_rtt, max_rtt, avg_rtt, stddev_rtt) = if rtts.is_empty() {
            (Duration::ZERO, Duration::ZERO, Duration::ZERO, Duration::ZERO)
        } else {
            let n = rtts.len() as u128;
            let total: u128 = rtts.iter().map(Duration::as_nanos).sum();
            let mean = total as f64 / n as f64;
            let variance = rtts
                .iter()
                .map(|rtt| (rtt.as_nanos() as f64 - mean).powi(2))
                .sum::<f64>()
                / n as f64;

            (
                rtts.iter().copied().min().unwrap_or_default(),
                rtts.iter().copied().max().unwrap_or_default(),
                nanos_to_duration(total / n),
                Duration::from_nanos(variance.sqrt() as u64),
            )
        };

        Self {
            packets_sent,
            packets_received,
            min_rtt,
            max_rtt,
            avg_rtt,
            stddev_rtt,
            packet_loss_ratio,
            resolved_address,
            display_address: display_address.into(),
        }
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// The output of probing one target once.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// Replies in arrival order.
    pub packets: Vec<Packet>,
    pub stats: Statistics,
    /// Wall-clock time the session finished.
    pub stats_timestamp: DateTime<Utc>,
}
