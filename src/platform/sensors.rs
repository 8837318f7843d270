//! Readings that sysinfo does not expose, taken straight from procfs/sysfs.
//!
//! Every function returns `None` when the source is missing, which the
//! collector records as an unavailable metric.

#[cfg(target_os = "linux")]
use std::fs;

#[cfg(target_os = "linux")]
const NET_DEV: &str = "/proc/net/dev";
#[cfg(target_os = "linux")]
const CPUFREQ_DIR: &str = "/sys/devices/system/cpu/cpu0/cpufreq";

/// Total dropped packets (rx + tx) across all interfaces.
pub fn network_drops() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        fs::read_to_string(NET_DEV)
            .ok()
            .and_then(|content| parse_net_dev_drops(&content))
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Hardware minimum and maximum CPU frequency in MHz.
pub fn cpu_frequency_bounds() -> Option<(f64, f64)> {
    #[cfg(target_os = "linux")]
    {
        let read_khz = |file: &str| -> Option<f64> {
            fs::read_to_string(format!("{}/{}", CPUFREQ_DIR, file))
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
        };
        let min = read_khz("cpuinfo_min_freq")?;
        let max = read_khz("cpuinfo_max_freq")?;
        Some((min / 1000.0, max / 1000.0))
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Sum the rx_drop and tx_drop columns of `/proc/net/dev`.
pub fn parse_net_dev_drops(content: &str) -> Option<u64> {
    let mut total = 0u64;
    let mut seen = false;

    // Two header lines, then `iface: rx_bytes rx_packets rx_errs rx_drop ... tx_bytes tx_packets tx_errs tx_drop ...`
    for line in content.lines().skip(2) {
        let Some((_, counters)) = line.split_once(':') else {
            continue;
        };
        let fields: Vec<u64> = counters
            .split_whitespace()
            .filter_map(|f| f.parse().ok())
            .collect();
        if fields.len() < 12 {
            continue;
        }
        total = total.saturating_add(fields[3]).saturating_add(fields[11]);
        seen = true;
    }

    seen.then_some(total)
}
