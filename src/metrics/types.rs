//! Core data types for emitted ping metrics.
//!
//! - [`MetricName`]: The closed set of series a sweep produces
//! - [`NumberDataPoint`]: One timestamped, attributed gauge value
//! - [`Metric`]: A named series with its data points
//! - [`MetricBatch`]: Everything one sweep hands to the consumer

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Attribute key for the resolved peer IP.
pub const ATTR_PEER_IP: &str = "net.peer.ip";

/// Attribute key for the peer as configured.
pub const ATTR_PEER_NAME: &str = "net.peer.name";

/// Data point attributes, ordered for stable output.
pub type Attributes = BTreeMap<String, String>;

/// Names of the series emitted by every sweep.
///
/// Declaration order is the order series appear in a [`MetricBatch`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
    AsRefStr,
)]
pub enum MetricName {
    /// Round-trip time of a single received reply.
    #[serde(rename = "ping.rtt")]
    #[strum(serialize = "ping.rtt")]
    Rtt,
    /// Minimum session round-trip time.
    #[serde(rename = "ping.rtt.min")]
    #[strum(serialize = "ping.rtt.min")]
    RttMin,
    /// Maximum session round-trip time.
    #[serde(rename = "ping.rtt.max")]
    #[strum(serialize = "ping.rtt.max")]
    RttMax,
    /// Mean session round-trip time.
    #[serde(rename = "ping.rtt.avg")]
    #[strum(serialize = "ping.rtt.avg")]
    RttAvg,
    /// Population standard deviation of session round-trip times.
    #[serde(rename = "ping.rtt.stddev")]
    #[strum(serialize = "ping.rtt.stddev")]
    RttStddev,
    /// Fraction of requests without a reply, in `[0, 1]`.
    #[serde(rename = "ping.loss.ratio")]
    #[strum(serialize = "ping.loss.ratio")]
    LossRatio,
}

impl MetricName {
    /// Unit of the series, `None` for dimensionless values.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::LossRatio => None,
            _ => Some("ms"),
        }
    }
}

/// A single gauge observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberDataPoint {
    /// Observed value.
    pub value: f64,
    /// Wall-clock time the value refers to (UTC).
    pub timestamp: DateTime<Utc>,
    /// Peer identity attributes.
    pub attributes: Attributes,
}

impl NumberDataPoint {
    /// Create a data point attributed to a peer.
    pub fn new(value: f64, timestamp: DateTime<Utc>, peer_ip: &str, peer_name: &str) -> Self {
        let attributes = Attributes::from([
            (ATTR_PEER_IP.to_string(), peer_ip.to_string()),
            (ATTR_PEER_NAME.to_string(), peer_name.to_string()),
        ]);
        Self {
            value,
            timestamp,
            attributes,
        }
    }

    /// The `net.peer.ip` attribute.
    pub fn peer_ip(&self) -> Option<&str> {
        self.attributes.get(ATTR_PEER_IP).map(String::as_str)
    }

    /// The `net.peer.name` attribute.
    pub fn peer_name(&self) -> Option<&str> {
        self.attributes.get(ATTR_PEER_NAME).map(String::as_str)
    }
}

/// A named gauge series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Series name.
    pub name: MetricName,
    /// Series unit (`ms`), absent for ratios.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Data points in emission order.
    pub data_points: Vec<NumberDataPoint>,
}

impl Metric {
    /// Create an empty series.
    pub fn new(name: MetricName) -> Self {
        Self {
            name,
            unit: name.unit().map(str::to_string),
            data_points: Vec::new(),
        }
    }
}

/// The output of one sweep: every series, each with zero or more points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBatch {
    metrics: Vec<Metric>,
}

impl MetricBatch {
    pub(crate) fn from_metrics(metrics: Vec<Metric>) -> Self {
        Self { metrics }
    }

    /// All series in declaration order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Look up a series by name.
    pub fn metric(&self, name: MetricName) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Data points of a series, empty if the series is missing.
    pub fn data_points(&self, name: MetricName) -> &[NumberDataPoint] {
        self.metric(name)
            .map(|m| m.data_points.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of data points across all series.
    pub fn data_point_count(&self) -> usize {
        self.metrics.iter().map(|m| m.data_points.len()).sum()
    }

    /// Whether no series holds any data point.
    pub fn is_empty(&self) -> bool {
        self.data_point_count() == 0
    }

    /// Consume the batch into its series.
    pub fn into_metrics(self) -> Vec<Metric> {
        self.metrics
    }
}
