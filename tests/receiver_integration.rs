//! Receiver Integration Tests
//!
//! Drive the full pipeline (config, ICMP prober, scheduler, aggregation,
//! consumer) over an in-memory ICMP transport.

use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use icmpcheck::collector::ping::{EchoReply, EchoSession, IcmpTransport};
use icmpcheck::collector::sweep;
use icmpcheck::metrics::{ATTR_PEER_NAME, MetricBatch, MetricName, NumberDataPoint};
use icmpcheck::{
    ChannelConsumer, IcmpCheckReceiver, IcmpProber, ReceiverConfig, ReceiverState, Target,
};
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// =============================================================================
// Test Helpers
// =============================================================================

/// How a simulated peer answers echo requests.
#[derive(Debug, Clone, Copy)]
enum Peer {
    Replies(Duration),
    Silent,
}

/// In-memory transport; addresses it does not know refuse to open.
#[derive(Debug, Clone, Default)]
struct FakeTransport {
    peers: Arc<HashMap<IpAddr, Peer>>,
}

impl FakeTransport {
    fn new(peers: &[(&str, Peer)]) -> Self {
        let peers = peers
            .iter()
            .map(|(addr, peer)| (addr.parse().expect("valid ip"), *peer))
            .collect();
        Self {
            peers: Arc::new(peers),
        }
    }
}

struct FakeSession {
    addr: IpAddr,
    peer: Peer,
}

#[async_trait::async_trait]
impl IcmpTransport for FakeTransport {
    type Session = FakeSession;

    async fn open(&self, addr: IpAddr) -> io::Result<FakeSession> {
        self.peers
            .get(&addr)
            .map(|peer| FakeSession { addr, peer: *peer })
            .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "raw socket denied"))
    }
}

#[async_trait::async_trait]
impl EchoSession for FakeSession {
    async fn echo(&self, _seq: u16, _wait: Duration) -> io::Result<Option<EchoReply>> {
        match self.peer {
            Peer::Replies(rtt) => Ok(Some(EchoReply {
                source: self.addr,
                rtt,
            })),
            Peer::Silent => std::future::pending().await,
        }
    }
}

/// Records the level and `target` field of every log event.
#[derive(Clone, Default)]
struct TargetLog {
    events: Arc<Mutex<Vec<(Level, Option<String>)>>>,
}

struct TargetField(Option<String>);

impl Visit for TargetField {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "target" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for TargetLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut target = TargetField(None);
        event.record(&mut target);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), target.0));
    }
}

impl TargetLog {
    fn targets_at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .filter_map(|(_, target)| target.clone())
            .collect()
    }
}

fn points_for<'a>(
    batch: &'a MetricBatch,
    name: MetricName,
    peer_name: &str,
) -> Vec<&'a NumberDataPoint> {
    batch
        .data_points(name)
        .iter()
        .filter(|p| p.peer_name() == Some(peer_name))
        .collect()
}

fn stat_point_count(batch: &MetricBatch, peer_name: &str) -> usize {
    [
        MetricName::RttMin,
        MetricName::RttMax,
        MetricName::RttAvg,
        MetricName::RttStddev,
        MetricName::LossRatio,
    ]
    .into_iter()
    .map(|name| points_for(batch, name, peer_name).len())
    .sum()
}

// =============================================================================
// Sweep Scenarios
// =============================================================================

#[tokio::test]
async fn test_unresolvable_target_is_skipped() {
    let prober = IcmpProber::with_transport(FakeTransport::new(&[(
        "192.0.2.10",
        Peer::Replies(Duration::from_millis(4)),
    )]));
    let targets = [
        Target::new("192.0.2.10")
            .with_ping_count(2)
            .with_ping_interval(Duration::from_millis(10)),
        Target::new("nx.icmpcheck.invalid"),
    ];

    let log = TargetLog::default();
    let batch = {
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(log.clone()));
        sweep(&targets, &prober).await
    };

    assert_eq!(log.targets_at(Level::WARN), ["nx.icmpcheck.invalid"]);
    assert!(log.targets_at(Level::ERROR).is_empty());
    assert_eq!(points_for(&batch, MetricName::Rtt, "192.0.2.10").len(), 2);
    assert!(
        points_for(&batch, MetricName::Rtt, "192.0.2.10")
            .iter()
            .all(|p| p.peer_ip() == Some("192.0.2.10"))
    );
    assert_eq!(stat_point_count(&batch, "192.0.2.10"), 5);
    assert_eq!(batch.data_point_count(), 7);
    assert!(
        batch
            .metrics()
            .iter()
            .flat_map(|m| &m.data_points)
            .all(|p| p.attributes.get(ATTR_PEER_NAME).map(String::as_str)
                != Some("nx.icmpcheck.invalid"))
    );
}

#[tokio::test]
async fn test_execution_failure_does_not_abort_sweep() {
    let prober = IcmpProber::with_transport(FakeTransport::new(&[(
        "192.0.2.20",
        Peer::Replies(Duration::from_millis(2)),
    )]));
    let targets = [
        Target::new("192.0.2.99"),
        Target::new("192.0.2.20")
            .with_ping_count(3)
            .with_ping_interval(Duration::from_millis(5)),
    ];

    let log = TargetLog::default();
    let batch = {
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(log.clone()));
        sweep(&targets, &prober).await
    };

    assert_eq!(log.targets_at(Level::ERROR), ["192.0.2.99"]);
    assert!(log.targets_at(Level::WARN).is_empty());
    assert_eq!(stat_point_count(&batch, "192.0.2.99"), 0);
    assert_eq!(points_for(&batch, MetricName::Rtt, "192.0.2.20").len(), 3);

    let loss = points_for(&batch, MetricName::LossRatio, "192.0.2.20");
    assert_eq!(loss[0].value, 0.0);
    let min = points_for(&batch, MetricName::RttMin, "192.0.2.20")[0].value;
    let avg = points_for(&batch, MetricName::RttAvg, "192.0.2.20")[0].value;
    let max = points_for(&batch, MetricName::RttMax, "192.0.2.20")[0].value;
    assert!(min <= avg && avg <= max);
}

// =============================================================================
// Receiver Lifecycle
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_unreachable_target_reports_total_loss() {
    let config = ReceiverConfig::new(Duration::from_secs(1)).with_target(
        Target::new("10.0.0.1")
            .with_ping_count(2)
            .with_ping_timeout(Duration::from_secs(1)),
    );
    let (consumer, mut rx) = ChannelConsumer::new(4);
    let prober = IcmpProber::with_transport(FakeTransport::new(&[("10.0.0.1", Peer::Silent)]));

    let mut receiver = IcmpCheckReceiver::new(config, prober, consumer).unwrap();
    receiver.start(&CancellationToken::new()).unwrap();

    // Tick at 1s, session deadline at 2s.
    let batch = rx.recv().await.unwrap();
    receiver.shutdown().unwrap();

    assert!(batch.data_points(MetricName::Rtt).is_empty());
    assert_eq!(stat_point_count(&batch, "10.0.0.1"), 5);
    assert_eq!(batch.data_points(MetricName::LossRatio)[0].value, 1.0);
    assert_eq!(batch.data_points(MetricName::RttMax)[0].value, 0.0);

    let stat_ts = batch.data_points(MetricName::LossRatio)[0].timestamp;
    for name in [MetricName::RttMin, MetricName::RttAvg, MetricName::RttStddev] {
        assert_eq!(batch.data_points(name)[0].timestamp, stat_ts);
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_first_tick() {
    let config = ReceiverConfig::new(Duration::from_secs(1)).with_target(Target::new("10.0.0.1"));
    let (consumer, mut rx) = ChannelConsumer::new(4);
    let prober = IcmpProber::with_transport(FakeTransport::new(&[(
        "10.0.0.1",
        Peer::Replies(Duration::from_millis(1)),
    )]));

    let mut receiver = IcmpCheckReceiver::new(config, prober, consumer).unwrap();
    receiver.start(&CancellationToken::new()).unwrap();
    receiver.shutdown().unwrap();
    receiver.shutdown().unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(receiver.state(), ReceiverState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_receiver_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("icmpcheck.yaml");
    std::fs::write(
        &path,
        r#"
interval: 10s
targets:
  - target: 192.0.2.1
    ping_count: 4
    ping_interval: 100ms
  - target: 192.0.2.2
    ping_timeout: 2s
"#,
    )
    .unwrap();

    let config = ReceiverConfig::load(&path).unwrap();
    let (consumer, mut rx) = ChannelConsumer::new(4);
    let prober = IcmpProber::with_transport(FakeTransport::new(&[
        ("192.0.2.1", Peer::Replies(Duration::from_millis(7))),
        ("192.0.2.2", Peer::Silent),
    ]));

    let mut receiver = IcmpCheckReceiver::new(config, prober, consumer).unwrap();
    receiver.start(&CancellationToken::new()).unwrap();

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    receiver
        .shutdown_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();

    for batch in [&first, &second] {
        assert_eq!(points_for(batch, MetricName::Rtt, "192.0.2.1").len(), 4);
        assert!(points_for(batch, MetricName::Rtt, "192.0.2.2").is_empty());
        assert_eq!(
            points_for(batch, MetricName::LossRatio, "192.0.2.2")[0].value,
            1.0
        );

        let peers: Vec<_> = batch
            .data_points(MetricName::LossRatio)
            .iter()
            .map(|p| p.peer_name().unwrap())
            .collect();
        assert_eq!(peers, ["192.0.2.1", "192.0.2.2"]);
    }
}

#[test]
fn test_invalid_config_never_starts() {
    let config = ReceiverConfig::from_yaml("interval: 0s\ntargets: []\n");
    assert!(config.is_err());

    let config = ReceiverConfig::new(Duration::from_secs(1))
        .with_target(Target::new("10.0.0.1").with_ping_count(0));
    let (consumer, _rx) = ChannelConsumer::new(1);
    let prober = IcmpProber::with_transport(FakeTransport::default());
    assert!(IcmpCheckReceiver::new(config, prober, consumer).is_err());
}
