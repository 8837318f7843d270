//! The fixed catalog of system-wide metrics.
//!
//! Every metric the dashboard can chart has one entry here with a stable key
//! (used by the config file, CLI flags and JSON output) and a display label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskpulseError};

/// A system-wide metric from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    Cpu,
    Memory,
    Disk,
    NetSent,
    NetRecv,
    NetTotal,
    Processes,
    Threads,
    Battery,
    Swap,
    DiskRead,
    DiskWrite,
    CpuTemp,
    BatteryTime,
    NetErrors,
    NetDrops,
    CpuFreq,
    CpuFreqMin,
    CpuFreqMax,
    VmemTotal,
    VmemAvailable,
    DiskTotal,
    DiskFree,
}

/// (metric, key, label) for the whole catalog, in display order.
const CATALOG: &[(MetricName, &str, &str)] = &[
    (MetricName::Cpu, "cpu", "CPU Usage (%)"),
    (MetricName::Memory, "memory", "Memory Usage (%)"),
    (MetricName::Disk, "disk", "Disk Usage (%)"),
    (MetricName::NetSent, "net_sent", "Network (Bytes Sent)"),
    (MetricName::NetRecv, "net_recv", "Network (Bytes Received)"),
    (MetricName::NetTotal, "net_total", "Network (Bytes Sent+Received)"),
    (MetricName::Processes, "processes", "Processes Count"),
    (MetricName::Threads, "threads", "Threads Count"),
    (MetricName::Battery, "battery", "Battery (%)"),
    (MetricName::Swap, "swap", "Swap Memory Usage (%)"),
    (MetricName::DiskRead, "disk_read", "Disk Read Bytes"),
    (MetricName::DiskWrite, "disk_write", "Disk Write Bytes"),
    (MetricName::CpuTemp, "cpu_temp", "CPU Temperature"),
    (MetricName::BatteryTime, "battery_time", "Battery Time Left (Minutes)"),
    (MetricName::NetErrors, "net_errors", "Network Errors"),
    (MetricName::NetDrops, "net_drops", "Network Drops"),
    (MetricName::CpuFreq, "cpu_freq", "CPU Frequency (Current)"),
    (MetricName::CpuFreqMin, "cpu_freq_min", "CPU Frequency (Min)"),
    (MetricName::CpuFreqMax, "cpu_freq_max", "CPU Frequency (Max)"),
    (MetricName::VmemTotal, "vmem_total", "Virtual Memory Total (MB)"),
    (MetricName::VmemAvailable, "vmem_available", "Virtual Memory Available (MB)"),
    (MetricName::DiskTotal, "disk_total", "Disk Total Space (GB)"),
    (MetricName::DiskFree, "disk_free", "Disk Free Space (GB)"),
];

impl MetricName {
    /// Metrics selected when nothing is configured.
    pub const DEFAULT_SELECTION: [MetricName; 3] =
        [MetricName::Cpu, MetricName::Memory, MetricName::Disk];

    /// Iterate the whole catalog in display order.
    pub fn all() -> impl Iterator<Item = MetricName> {
        CATALOG.iter().map(|(metric, _, _)| *metric)
    }

    fn entry(self) -> &'static (MetricName, &'static str, &'static str) {
        // CATALOG lists every variant exactly once
        CATALOG
            .iter()
            .find(|(metric, _, _)| *metric == self)
            .unwrap_or(&CATALOG[0])
    }

    /// Stable machine key, e.g. `net_sent`.
    pub fn key(self) -> &'static str {
        self.entry().1
    }

    /// Human label, e.g. `Network (Bytes Sent)`.
    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// Whether the value is a percentage in 0..=100 (charts pin the y-axis).
    pub fn is_percent(self) -> bool {
        matches!(
            self,
            MetricName::Cpu
                | MetricName::Memory
                | MetricName::Disk
                | MetricName::Battery
                | MetricName::Swap
        )
    }

    /// Parse a comma-separated list, rejecting the first unknown name.
    ///
    /// Duplicates are dropped, first occurrence wins.
    pub fn parse_list(list: &str) -> Result<Vec<MetricName>> {
        let mut selected = Vec::new();
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let metric: MetricName = part.parse()?;
            if !selected.contains(&metric) {
                selected.push(metric);
            }
        }
        Ok(selected)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricName {
    type Err = TaskpulseError;

    /// Accepts either the key or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        CATALOG
            .iter()
            .find(|(_, key, label)| {
                key.eq_ignore_ascii_case(wanted) || label.eq_ignore_ascii_case(wanted)
            })
            .map(|(metric, _, _)| *metric)
            .ok_or_else(|| {
                TaskpulseError::invalid_metric(
                    wanted,
                    "not a system metric (run `taskpulse metrics` for the catalog)",
                )
            })
    }
}
