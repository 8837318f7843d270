use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::system_monitor::{
    LoopConfig, MetricName, Preset, ProcessFilter, ProcessMetric, ProcessStatus, RankDirection,
    RankingRequest,
};
use crate::error::TaskpulseError;

/// Shortest refresh interval accepted from the config file or flags.
///
/// Never below sysinfo's minimum CPU update window, otherwise per-tick CPU
/// deltas are meaningless.
pub const MIN_INTERVAL_MS: u64 = {
    let sysinfo_min = sysinfo::MINIMUM_CPU_UPDATE_INTERVAL.as_millis() as u64;
    if sysinfo_min > 200 {
        sysinfo_min
    } else {
        200
    }
};

/// Persisted dashboard settings.
///
/// Names are kept as strings so a bad entry is reported by
/// [`Config::resolve`] with the offending name instead of discarding the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog keys or labels of the charted metrics
    pub metrics: Vec<String>,
    /// Explicit rankings as `metric[:top|bottom]`; empty means use `preset`
    pub rank: Vec<String>,
    pub preset: String,
    pub count: usize,
    /// Restrict rankings to these process statuses
    pub status: Vec<String>,
    pub interval_ms: u64,
    pub log_csv: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics: MetricName::DEFAULT_SELECTION
                .iter()
                .map(|m| m.key().to_string())
                .collect(),
            rank: Vec::new(),
            preset: Preset::default().as_str().to_string(),
            count: 10,
            status: Vec::new(),
            interval_ms: 1000,
            log_csv: None,
        }
    }
}

/// Keys accepted by [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "metrics",
    "rank",
    "preset",
    "count",
    "status",
    "interval_ms",
    "log_csv",
];

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Read a config file. A missing, empty or unparsable file yields defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Config::default());
        }

        Ok(serde_json::from_slice(&data).unwrap_or_else(|e| {
            log::warn!(
                "Ignoring unreadable config file {:?} ({}); using defaults",
                config_path,
                e
            );
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data + "\n")
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("taskpulse").join("config.json"))
    }

    /// Set one key from its string form, validating the result.
    pub fn set(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        let mut updated = self.clone();
        match key {
            "metrics" => updated.metrics = split_list(value),
            "rank" => updated.rank = split_list(value),
            "preset" => updated.preset = value.trim().to_string(),
            "count" => {
                updated.count = value.trim().parse().map_err(|_| {
                    TaskpulseError::config(format!("count must be a number, got '{}'", value))
                })?
            }
            "status" => updated.status = split_list(value),
            "interval_ms" => {
                updated.interval_ms = value.trim().parse().map_err(|_| {
                    TaskpulseError::config(format!("interval_ms must be a number, got '{}'", value))
                })?
            }
            "log_csv" => {
                let value = value.trim();
                updated.log_csv = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            other => {
                return Err(TaskpulseError::config(format!(
                    "Unknown config key '{}' (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        updated.resolve()?;
        *self = updated;
        Ok(())
    }

    /// Validate every name and bound and build the loop configuration.
    pub fn resolve(&self) -> crate::error::Result<LoopConfig> {
        if !(RankingRequest::MIN_COUNT..=RankingRequest::MAX_COUNT).contains(&self.count) {
            return Err(TaskpulseError::config(format!(
                "count must be between {} and {}, got {}",
                RankingRequest::MIN_COUNT,
                RankingRequest::MAX_COUNT,
                self.count
            )));
        }
        if self.interval_ms < MIN_INTERVAL_MS {
            return Err(TaskpulseError::config(format!(
                "interval_ms must be at least {}, got {}",
                MIN_INTERVAL_MS, self.interval_ms
            )));
        }

        let mut metrics = Vec::new();
        for name in &self.metrics {
            let metric: MetricName = name.parse()?;
            if !metrics.contains(&metric) {
                metrics.push(metric);
            }
        }

        let filter = self.status_filter()?;
        let rankings = if self.rank.is_empty() {
            let mut request = self.preset.parse::<Preset>()?.request(self.count);
            if let Some(status) = filter {
                request.filter = Some(match request.filter.take() {
                    Some(preset_filter) => preset_filter.and(status),
                    None => status,
                });
            }
            vec![request]
        } else {
            self.rank
                .iter()
                .map(|spec| {
                    let mut request = parse_rank_spec(spec, self.count)?;
                    request.filter = filter.clone();
                    Ok(request)
                })
                .collect::<crate::error::Result<Vec<_>>>()?
        };

        Ok(LoopConfig {
            metrics,
            rankings,
            interval: Duration::from_millis(self.interval_ms),
            max_ticks: None,
        })
    }

    fn status_filter(&self) -> crate::error::Result<Option<ProcessFilter>> {
        if self.status.is_empty() {
            return Ok(None);
        }
        let statuses = self
            .status
            .iter()
            .map(|s| s.parse::<ProcessStatus>())
            .collect::<crate::error::Result<Vec<_>>>()?;
        Ok(Some(ProcessFilter::Status(statuses)))
    }
}

/// Parse `metric[:top|bottom]` into a request for `count` processes.
pub fn parse_rank_spec(spec: &str, count: usize) -> crate::error::Result<RankingRequest> {
    let (metric, direction) = match spec.split_once(':') {
        Some((metric, direction)) => (metric, direction.parse::<RankDirection>()?),
        None => (spec, RankDirection::Top),
    };
    let metric: ProcessMetric = metric.parse()?;
    Ok(RankingRequest::new(metric, direction, count))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
