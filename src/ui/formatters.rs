use chrono::{Local, TimeZone};
use humansize::{format_size as human_format_size, DECIMAL};

use crate::core::system_monitor::{MetricName, ProcessMetric, ProcessRecord};

/// Format a byte count in human-readable form (kB, MB, GB)
pub fn format_size(size: u64) -> String {
    human_format_size(size, DECIMAL)
}

/// Format a Unix timestamp as local wall-clock time (HH:MM:SS)
pub fn format_clock(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Format a system metric reading for display next to its label
pub fn format_metric_value(metric: MetricName, value: Option<f64>) -> String {
    let Some(value) = value else {
        return "n/a".to_string();
    };

    match metric {
        m if m.is_percent() => format!("{:.1}%", value),
        MetricName::NetSent
        | MetricName::NetRecv
        | MetricName::NetTotal
        | MetricName::DiskRead
        | MetricName::DiskWrite => format_size(value.max(0.0) as u64),
        MetricName::CpuTemp => format!("{:.1}°C", value),
        MetricName::CpuFreq | MetricName::CpuFreqMin | MetricName::CpuFreqMax => {
            format!("{:.0} MHz", value)
        }
        MetricName::VmemTotal | MetricName::VmemAvailable => format!("{:.0} MB", value),
        MetricName::DiskTotal | MetricName::DiskFree => format!("{:.1} GB", value),
        _ => format!("{:.0}", value),
    }
}

/// Format the ranked field of one process
pub fn format_process_value(metric: ProcessMetric, record: &ProcessRecord) -> String {
    match (metric, metric.value(record)) {
        (_, None) => "-".to_string(),
        (ProcessMetric::Cpu | ProcessMetric::Memory, Some(v)) => format!("{:.1}%", v),
        (
            ProcessMetric::MemoryBytes
            | ProcessMetric::IoReadBytes
            | ProcessMetric::IoWriteBytes
            | ProcessMetric::IoTotalBytes,
            Some(v),
        ) => format_size(v as u64),
        (ProcessMetric::StartTime, Some(v)) => format_clock(v as i64),
        (_, Some(v)) => format!("{:.0}", v),
    }
}
