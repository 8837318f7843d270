//! One row of system-wide readings per tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::MetricName;

/// A metric reading, or the marker for a sensor that is not present.
///
/// `Unavailable` is not zero: a host without a battery reports
/// `Unavailable` for `battery`, never `Value(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum MetricValue {
    Value(f64),
    Unavailable,
}

impl MetricValue {
    pub fn value(self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(v),
            MetricValue::Unavailable => None,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, MetricValue::Value(_))
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(reading: Option<f64>) -> Self {
        match reading {
            Some(v) if v.is_finite() => MetricValue::Value(v),
            _ => MetricValue::Unavailable,
        }
    }
}

impl From<MetricValue> for Option<f64> {
    fn from(value: MetricValue) -> Self {
        value.value()
    }
}

/// System metrics captured at one point in time.
///
/// Every metric that was requested for the tick has exactly one entry,
/// so a series built from consecutive snapshots stays rectangular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    values: BTreeMap<MetricName, MetricValue>,
}

impl MetricSnapshot {
    /// Start a snapshot for `selected`; every metric begins as unavailable.
    pub fn builder(timestamp: i64, selected: &[MetricName]) -> SnapshotBuilder {
        SnapshotBuilder {
            timestamp,
            values: selected
                .iter()
                .map(|metric| (*metric, MetricValue::Unavailable))
                .collect(),
        }
    }

    /// The entry for `metric`, or `None` if it was not requested this tick.
    pub fn get(&self, metric: MetricName) -> Option<MetricValue> {
        self.values.get(&metric).copied()
    }

    /// The numeric reading for `metric`, if requested and available.
    pub fn value(&self, metric: MetricName) -> Option<f64> {
        self.get(metric).and_then(MetricValue::value)
    }

    pub fn contains(&self, metric: MetricName) -> bool {
        self.values.contains_key(&metric)
    }

    pub fn metrics(&self) -> impl Iterator<Item = MetricName> + '_ {
        self.values.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (MetricName, MetricValue)> + '_ {
        self.values.iter().map(|(metric, value)| (*metric, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Local wall-clock time of the snapshot, second resolution.
    pub fn local_time(&self) -> Option<chrono::DateTime<chrono::Local>> {
        chrono::DateTime::from_timestamp(self.timestamp, 0).map(|utc| utc.with_timezone(&chrono::Local))
    }
}

/// Fills in readings for a snapshot; metrics never recorded stay unavailable.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    timestamp: i64,
    values: BTreeMap<MetricName, MetricValue>,
}

impl SnapshotBuilder {
    /// Record a reading. Readings for metrics outside the selection are
    /// ignored and `false` is returned. Non-finite readings count as
    /// unavailable.
    pub fn record(&mut self, metric: MetricName, reading: Option<f64>) -> bool {
        match self.values.get_mut(&metric) {
            Some(slot) => {
                *slot = MetricValue::from(reading);
                true
            }
            None => false,
        }
    }

    pub fn build(self) -> MetricSnapshot {
        MetricSnapshot {
            timestamp: self.timestamp,
            values: self.values,
        }
    }
}
