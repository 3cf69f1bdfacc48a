//! ICMP echo transport backed by `surge-ping`.

use std::io;
use std::net::IpAddr;
use std::time::Duration;

use surge_ping::{Client, Config, ICMP, IcmpPacket, PingIdentifier, PingSequence, SurgeError};

use super::session::{EchoReply, EchoSession, IcmpTransport};

/// Echo request payload, the customary 56 bytes.
const PAYLOAD: [u8; 56] = [0; 56];

/// Raw-socket ICMP transport.
///
/// Opens one client per session; the socket kind follows the IP version of
/// the peer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurgeTransport;

/// A `surge-ping` client bound to one peer and one identifier.
pub struct SurgeSession {
    client: Client,
    addr: IpAddr,
    ident: PingIdentifier,
}

impl std::fmt::Debug for SurgeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurgeSession")
            .field("addr", &self.addr)
            .field("ident", &self.ident.0)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl IcmpTransport for SurgeTransport {
    type Session = SurgeSession;

    async fn open(&self, addr: IpAddr) -> io::Result<SurgeSession> {
        let config = match addr {
            IpAddr::V4(_) => Config::default(),
            IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
        };
        let client = Client::new(&config)?;

        Ok(SurgeSession {
            client,
            addr,
            ident: PingIdentifier(rand::random()),
        })
    }
}

#[async_trait::async_trait]
impl EchoSession for SurgeSession {
    async fn echo(&self, seq: u16, wait: Duration) -> io::Result<Option<EchoReply>> {
        let mut pinger = self.client.pinger(self.addr, self.ident).await;
        pinger.timeout(wait);

        match pinger.ping(PingSequence(seq), &PAYLOAD).await {
            Ok((packet, rtt)) => Ok(Some(EchoReply {
                source: reply_source(&packet),
                rtt,
            })),
            Err(SurgeError::Timeout { .. }) => Ok(None),
            Err(SurgeError::IOError(e)) => Err(e),
            Err(e) => {
                tracing::debug!(peer = %self.addr, seq, error = %e, "Discarding unusable echo reply");
                Ok(None)
            }
        }
    }
}

/// Source address of a decoded reply.
fn reply_source(packet: &IcmpPacket) -> IpAddr {
    match packet {
        IcmpPacket::V4(p) => IpAddr::V4(p.get_source()),
        IcmpPacket::V6(p) => IpAddr::V6(p.get_source()),
    }
}
