//! Per-process records and the numeric fields a ranking can target.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskpulseError};

/// Scheduler state of a process at sample time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Idle,
    Stopped,
    Zombie,
    Dead,
    DiskSleep,
    Tracing,
    Parked,
    Unknown,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 10] = [
        ProcessStatus::Running,
        ProcessStatus::Sleeping,
        ProcessStatus::Idle,
        ProcessStatus::Stopped,
        ProcessStatus::Zombie,
        ProcessStatus::Dead,
        ProcessStatus::DiskSleep,
        ProcessStatus::Tracing,
        ProcessStatus::Parked,
        ProcessStatus::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::Idle => "idle",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Zombie => "zombie",
            ProcessStatus::Dead => "dead",
            ProcessStatus::DiskSleep => "disk-sleep",
            ProcessStatus::Tracing => "tracing",
            ProcessStatus::Parked => "parked",
            ProcessStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessStatus {
    type Err = TaskpulseError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ProcessStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| TaskpulseError::config(format!("Unknown process status '{}'", s)))
    }
}

/// Cumulative disk I/O of one process. A compound value: rankings pick one
/// projection through [`ProcessMetric`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// One observed process. Only meaningful within the snapshot it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub memory_bytes: u64,
    pub thread_count: Option<u32>,
    pub status: ProcessStatus,
    /// Unix timestamp of process creation
    pub start_time: u64,
    pub io: Option<IoCounters>,
    pub user: Option<String>,
}

impl ProcessRecord {
    /// A record with every optional field empty.
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            cpu_percent: 0.0,
            memory_percent: 0.0,
            memory_bytes: 0,
            thread_count: None,
            status: ProcessStatus::Unknown,
            start_time: 0,
            io: None,
            user: None,
        }
    }
}

/// A numeric field of [`ProcessRecord`] usable as a ranking key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessMetric {
    Pid,
    Cpu,
    Memory,
    MemoryBytes,
    Threads,
    StartTime,
    IoReadBytes,
    IoWriteBytes,
    IoTotalBytes,
}

/// Names that denote the whole I/O bundle rather than one projection.
const COMPOUND_IO_NAMES: [&str; 3] = ["io", "io_counters", "disk_io"];

impl ProcessMetric {
    pub const ALL: [ProcessMetric; 9] = [
        ProcessMetric::Pid,
        ProcessMetric::Cpu,
        ProcessMetric::Memory,
        ProcessMetric::MemoryBytes,
        ProcessMetric::Threads,
        ProcessMetric::StartTime,
        ProcessMetric::IoReadBytes,
        ProcessMetric::IoWriteBytes,
        ProcessMetric::IoTotalBytes,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ProcessMetric::Pid => "pid",
            ProcessMetric::Cpu => "cpu",
            ProcessMetric::Memory => "memory",
            ProcessMetric::MemoryBytes => "memory_bytes",
            ProcessMetric::Threads => "threads",
            ProcessMetric::StartTime => "start_time",
            ProcessMetric::IoReadBytes => "io_read_bytes",
            ProcessMetric::IoWriteBytes => "io_write_bytes",
            ProcessMetric::IoTotalBytes => "io_total_bytes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProcessMetric::Pid => "PID",
            ProcessMetric::Cpu => "CPU (%)",
            ProcessMetric::Memory => "Memory (%)",
            ProcessMetric::MemoryBytes => "Memory (bytes)",
            ProcessMetric::Threads => "Threads",
            ProcessMetric::StartTime => "Start Time",
            ProcessMetric::IoReadBytes => "I/O Read Bytes",
            ProcessMetric::IoWriteBytes => "I/O Write Bytes",
            ProcessMetric::IoTotalBytes => "I/O Total Bytes",
        }
    }

    /// Extract the ranking key, or `None` when the record lacks the field.
    pub fn value(self, record: &ProcessRecord) -> Option<f64> {
        match self {
            ProcessMetric::Pid => Some(record.pid as f64),
            ProcessMetric::Cpu => Some(record.cpu_percent as f64),
            ProcessMetric::Memory => Some(record.memory_percent as f64),
            ProcessMetric::MemoryBytes => Some(record.memory_bytes as f64),
            ProcessMetric::Threads => record.thread_count.map(f64::from),
            ProcessMetric::StartTime => Some(record.start_time as f64),
            ProcessMetric::IoReadBytes => record.io.map(|io| io.read_bytes as f64),
            ProcessMetric::IoWriteBytes => record.io.map(|io| io.write_bytes as f64),
            ProcessMetric::IoTotalBytes => record
                .io
                .map(|io| io.read_bytes.saturating_add(io.write_bytes) as f64),
        }
    }
}

impl fmt::Display for ProcessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProcessMetric {
    type Err = TaskpulseError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        let metric = match wanted.as_str() {
            "pid" => ProcessMetric::Pid,
            "cpu" | "cpu_percent" => ProcessMetric::Cpu,
            "memory" | "mem" | "memory_percent" => ProcessMetric::Memory,
            "memory_bytes" | "rss" => ProcessMetric::MemoryBytes,
            "threads" | "num_threads" => ProcessMetric::Threads,
            "start_time" | "create_time" => ProcessMetric::StartTime,
            "io_read_bytes" | "io_read" => ProcessMetric::IoReadBytes,
            "io_write_bytes" | "io_write" => ProcessMetric::IoWriteBytes,
            "io_total_bytes" | "io_total" => ProcessMetric::IoTotalBytes,
            name if COMPOUND_IO_NAMES.contains(&name) => {
                return Err(TaskpulseError::invalid_metric(
                    s.trim(),
                    "compound value; rank by io_read_bytes, io_write_bytes or io_total_bytes",
                ))
            }
            _ => {
                return Err(TaskpulseError::invalid_metric(
                    s.trim(),
                    "not a numeric process field",
                ))
            }
        };
        Ok(metric)
    }
}
