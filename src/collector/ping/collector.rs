//! ICMP ping prober.
//!
//! Resolves a target, runs one paced echo session against it and summarizes
//! the replies.

use std::net::IpAddr;
use std::time::Duration;

use chrono::Utc;

use super::session::{IcmpTransport, run_session};
use super::transport::SurgeTransport;
use crate::collector::{ProbeError, ProbeResult, Prober, Statistics};
use crate::config::Target;

/// ICMP echo prober.
///
/// Generic over the transport so sessions can be driven without raw-socket
/// privileges in tests.
#[derive(Debug, Clone, Default)]
pub struct IcmpProber<T = SurgeTransport> {
    transport: T,
}

impl IcmpProber<SurgeTransport> {
    /// Create a prober using raw ICMP sockets.
    pub fn new() -> Self {
        Self {
            transport: SurgeTransport,
        }
    }
}

impl<T: IcmpTransport> IcmpProber<T> {
    /// Create a prober on top of a custom transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }
}

/// Resolve hostname to IP address.
async fn resolve_host(host: &str) -> Result<IpAddr, std::io::Error> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses found"))
}

#[async_trait::async_trait]
impl<T: IcmpTransport> Prober for IcmpProber<T> {
    async fn probe(&self, target: &Target) -> Result<ProbeResult, ProbeError> {
        let ip_addr =
            resolve_host(&target.address)
                .await
                .map_err(|source| ProbeError::Resolution {
                    target: target.address.clone(),
                    source,
                })?;

        let execution_error = |source| ProbeError::Execution {
            target: target.address.clone(),
            source,
        };

        let session = self.transport.open(ip_addr).await.map_err(execution_error)?;
        let outcome = run_session(
            &session,
            target.ping_count(),
            target.ping_timeout(),
            target.ping_interval(),
        )
        .await
        .map_err(execution_error)?;

        let rtts: Vec<Duration> = outcome.packets.iter().map(|p| p.rtt).collect();
        let stats = Statistics::from_rtts(outcome.sent, &rtts, ip_addr, target.address.clone());

        tracing::debug!(
            target = %target.address,
            peer = %ip_addr,
            sent = stats.packets_sent,
            received = stats.packets_received,
            loss_ratio = stats.packet_loss_ratio,
            "Ping session finished"
        );

        Ok(ProbeResult {
            packets: outcome.packets,
            stats,
            stats_timestamp: Utc::now(),
        })
    }
}
