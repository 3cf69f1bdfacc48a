//! Paced echo session bounded by a single deadline.
//!
//! Requests are dispatched every `spacing`, starting immediately, without
//! waiting for earlier replies. Every dispatched request waits for its reply
//! until the session deadline; requests scheduled at or after the deadline
//! are never sent.

use std::io;
use std::net::IpAddr;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::{Instant, sleep_until, timeout};

use crate::collector::Packet;

/// Transport able to open echo sessions towards one address.
#[async_trait::async_trait]
pub trait IcmpTransport: Send + Sync + 'static {
    /// Session type bound to a single peer.
    type Session: EchoSession;

    /// Open a session towards `addr`.
    ///
    /// Fails when the underlying socket cannot be created, e.g. for lack of
    /// raw-socket permission.
    async fn open(&self, addr: IpAddr) -> io::Result<Self::Session>;
}

/// A matched echo reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReply {
    /// Address the reply came from.
    pub source: IpAddr,
    /// Round-trip time of the request.
    pub rtt: Duration,
}

/// One peer-bound echo channel.
#[async_trait::async_trait]
pub trait EchoSession: Send + Sync {
    /// Send echo request `seq` and wait up to `wait` for its reply.
    ///
    /// Returns the reply, or `None` when it did not arrive in time. `Err` is
    /// reserved for transport failures.
    async fn echo(&self, seq: u16, wait: Duration) -> io::Result<Option<EchoReply>>;
}

/// Raw outcome of a session, before statistics are derived.
#[derive(Debug, Default)]
pub(crate) struct SessionOutcome {
    /// Requests actually dispatched.
    pub sent: u32,
    /// Replies in arrival order.
    pub packets: Vec<Packet>,
}

enum Echo {
    Reply(Packet),
    Lost,
    NotSent,
}

/// Drive `count` echo requests through `session` within `budget`.
pub(crate) async fn run_session<S: EchoSession>(
    session: &S,
    count: u16,
    budget: Duration,
    spacing: Duration,
) -> io::Result<SessionOutcome> {
    let start = Instant::now();
    let deadline = start + budget;

    let mut pending: FuturesUnordered<_> = (0..count)
        .map(|seq| {
            let send_at = spacing
                .checked_mul(u32::from(seq))
                .and_then(|offset| start.checked_add(offset))
                .filter(|at| *at < deadline);

            async move {
                let Some(send_at) = send_at else {
                    return Ok(Echo::NotSent);
                };
                sleep_until(send_at).await;

                let wait = deadline.saturating_duration_since(Instant::now());
                match timeout(wait, session.echo(seq, wait)).await {
                    Ok(Ok(Some(reply))) => Ok(Echo::Reply(Packet {
                        timestamp: Utc::now(),
                        rtt: reply.rtt,
                        source: reply.source,
                    })),
                    Ok(Ok(None)) | Err(_) => Ok(Echo::Lost),
                    Ok(Err(e)) => Err(e),
                }
            }
        })
        .collect();

    let mut outcome = SessionOutcome::default();
    while let Some(echo) = pending.next().await {
        match echo? {
            Echo::Reply(packet) => {
                outcome.sent += 1;
                outcome.packets.push(packet);
            }
            Echo::Lost => outcome.sent += 1,
            Echo::NotSent => {}
        }
    }

    Ok(outcome)
}
