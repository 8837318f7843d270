//! Append-only CSV record of CPU and memory usage, one row per tick.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::catalog::MetricName;
use super::snapshot::MetricSnapshot;
use crate::error::Result;

/// Metrics every log row carries, in column order after the timestamp.
pub const LOGGED_METRICS: [MetricName; 2] = [MetricName::Cpu, MetricName::Memory];

const HEADER: [&str; 3] = ["Timestamp", "CPU Usage", "Memory Usage"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct LogRow {
    timestamp: String,
    cpu_usage: Option<f64>,
    memory_usage: Option<f64>,
}

/// CSV file that is created with a header when absent (or empty) and only
/// ever appended to afterwards.
#[derive(Debug, Clone)]
pub struct MetricsLog {
    path: PathBuf,
}

impl MetricsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row for `snapshot`. Unavailable values are written as
    /// empty fields.
    pub fn append(&self, snapshot: &MetricSnapshot) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }

        let timestamp = snapshot
            .local_time()
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| snapshot.timestamp.to_string());
        writer.serialize(LogRow {
            timestamp,
            cpu_usage: snapshot.value(MetricName::Cpu),
            memory_usage: snapshot.value(MetricName::Memory),
        })?;
        writer.flush()?;
        Ok(())
    }
}
