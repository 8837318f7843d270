// Command handlers module
pub mod completions;
pub mod config;
pub mod metrics;
pub mod monitor;
pub mod stream;
pub mod top;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::Config;
use crate::core::system_monitor::{LoopConfig, MetricsLog, Preset};

/// Loop settings after merging the config file with command-line flags.
pub struct Settings {
    pub loop_config: LoopConfig,
    pub log: Option<MetricsLog>,
    /// Preset in effect when no explicit `--rank` was given
    pub preset: Option<Preset>,
}

/// Load the config file and apply the sampling flags shared by
/// `monitor`, `stream` and `top`.
pub fn resolve_settings(matches: &ArgMatches) -> Result<Settings> {
    let mut config = Config::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, matches);

    let loop_config = config.resolve().context("Invalid monitor settings")?;
    let preset = if config.rank.is_empty() {
        config.preset.parse::<Preset>().ok()
    } else {
        None
    };

    Ok(Settings {
        loop_config,
        log: config.log_csv.map(MetricsLog::new),
        preset,
    })
}

/// Flags override file values; absent flags leave them untouched.
pub fn apply_overrides(config: &mut Config, matches: &ArgMatches) {
    if let Some(metrics) = matches.get_one::<String>("metrics") {
        config.metrics = split_csv(metrics);
    }
    if let Some(ranks) = matches.get_many::<String>("rank") {
        config.rank = ranks.cloned().collect();
    }
    if let Some(preset) = matches.get_one::<String>("preset") {
        config.preset = preset.clone();
        // An explicit preset replaces rankings from the file
        if matches.get_many::<String>("rank").is_none() {
            config.rank.clear();
        }
    }
    if let Some(count) = matches.get_one::<usize>("count") {
        config.count = *count;
    }
    if let Some(status) = matches.get_one::<String>("status") {
        config.status = split_csv(status);
    }
    if let Some(interval) = matches.get_one::<u64>("interval-ms") {
        config.interval_ms = *interval;
    }
    if let Some(path) = matches.get_one::<PathBuf>("log-csv") {
        config.log_csv = Some(path.clone());
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
