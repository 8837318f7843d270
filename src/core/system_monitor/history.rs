use std::iter::FusedIterator;

use super::catalog::MetricName;
use super::snapshot::MetricSnapshot;

/// Session-lifetime, append-only record of system snapshots (backs the charts).
///
/// Snapshots are kept in append order, and their timestamps never decrease. Nothing is evicted: the
/// store lives as long as the session that owns it.
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    snapshots: Vec<MetricSnapshot>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(capacity),
        }
    }

    /// Append a snapshot. Earlier snapshots are never touched.
    ///
    /// A timestamp earlier than the previous one (wall clock stepped back)
    /// is raised to the previous timestamp, so series stay non-decreasing.
    pub fn append(&mut self, mut snapshot: MetricSnapshot) {
        if let Some(last) = self.snapshots.last() {
            if snapshot.timestamp < last.timestamp {
                log::debug!(
                    "Snapshot timestamp {} precedes previous {}, clamping",
                    snapshot.timestamp,
                    last.timestamp
                );
                snapshot.timestamp = last.timestamp;
            }
        }
        self.snapshots.push(snapshot);
    }

    /// `(timestamp, value)` pairs for `metric`, skipping snapshots where it
    /// was unavailable or not requested.
    ///
    /// The returned iterator is lazy and `Clone`, so it can be replayed.
    pub fn as_series(&self, metric: MetricName) -> Series<'_> {
        Series {
            snapshots: &self.snapshots,
            metric,
            position: 0,
        }
    }

    pub fn snapshots(&self) -> &[MetricSnapshot] {
        &self.snapshots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricSnapshot> {
        self.snapshots.iter()
    }

    pub fn latest(&self) -> Option<&MetricSnapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Lazy per-metric view over a [`SampleStore`].
#[derive(Debug, Clone)]
pub struct Series<'a> {
    snapshots: &'a [MetricSnapshot],
    metric: MetricName,
    position: usize,
}

impl Series<'_> {
    pub fn metric(&self) -> MetricName {
        self.metric
    }

    /// Collect the remaining points as chart coordinates.
    pub fn to_points(&self) -> Vec<(f64, f64)> {
        self.clone().map(|(ts, v)| (ts as f64, v)).collect()
    }
}

impl Iterator for Series<'_> {
    type Item = (i64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(snapshot) = self.snapshots.get(self.position) {
            self.position += 1;
            if let Some(value) = snapshot.value(self.metric) {
                return Some((snapshot.timestamp, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.snapshots.len().saturating_sub(self.position)))
    }
}

impl FusedIterator for Series<'_> {}
