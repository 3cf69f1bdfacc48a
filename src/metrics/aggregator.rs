//! Conversion of probe results into ping metric series.

use std::time::Duration;

use crate::collector::ProbeResult;
use crate::metrics::{Metric, MetricBatch, MetricName, NumberDataPoint};

/// Convert a duration to fractional milliseconds.
pub fn duration_to_ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1e6
}

/// Accumulates the series of one sweep.
///
/// Each recorded result contributes one `ping.rtt` point per received reply
/// and exactly one point to each statistic series. Targets that failed to
/// probe are simply never recorded.
#[derive(Debug)]
pub struct SweepAggregator {
    rtt: Metric,
    rtt_min: Metric,
    rtt_max: Metric,
    rtt_avg: Metric,
    rtt_stddev: Metric,
    loss_ratio: Metric,
}

impl Default for SweepAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepAggregator {
    /// Start an empty sweep.
    pub fn new() -> Self {
        Self {
            rtt: Metric::new(MetricName::Rtt),
            rtt_min: Metric::new(MetricName::RttMin),
            rtt_max: Metric::new(MetricName::RttMax),
            rtt_avg: Metric::new(MetricName::RttAvg),
            rtt_stddev: Metric::new(MetricName::RttStddev),
            loss_ratio: Metric::new(MetricName::LossRatio),
        }
    }

    /// Append the points of one target's probe result.
    pub fn record(&mut self, result: ProbeResult) {
        let stats = &result.stats;
        let peer_name = stats.display_address.as_str();

        for packet in &result.packets {
            self.rtt.data_points.push(NumberDataPoint::new(
                duration_to_ms(packet.rtt),
                packet.timestamp,
                &packet.source.to_string(),
                peer_name,
            ));
        }

        let peer_ip = stats.resolved_address.to_string();
        let ts = result.stats_timestamp;
        let point = |value| NumberDataPoint::new(value, ts, &peer_ip, peer_name);

        self.loss_ratio
            .data_points
            .push(point(stats.packet_loss_ratio));
        self.rtt_min
            .data_points
            .push(point(duration_to_ms(stats.min_rtt)));
        self.rtt_max
            .data_points
            .push(point(duration_to_ms(stats.max_rtt)));
        self.rtt_avg
            .data_points
            .push(point(duration_to_ms(stats.avg_rtt)));
        self.rtt_stddev
            .data_points
            .push(point(duration_to_ms(stats.stddev_rtt)));
    }

    /// Close the sweep and produce its batch.
    pub fn finish(self) -> MetricBatch {
        MetricBatch::from_metrics(vec![
            self.rtt,
            self.rtt_min,
            self.rtt_max,
            self.rtt_avg,
            self.rtt_stddev,
            self.loss_ratio,
        ])
    }
}
