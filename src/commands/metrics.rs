use anyhow::Result;
use colored::Colorize;

use crate::core::system_monitor::{MetricName, Preset, ProcessMetric};

/// List the metric catalog, rankable process fields and presets
pub fn execute() -> Result<()> {
    println!("{}", "System metrics".bold().cyan());
    for metric in MetricName::all() {
        let marker = if MetricName::DEFAULT_SELECTION.contains(&metric) {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!(" {} {:<16} {}", marker, metric.key(), metric.label().dimmed());
    }
    println!("   {}", "* selected by default".dimmed());

    println!();
    println!("{}", "Process ranking fields".bold().cyan());
    for metric in ProcessMetric::ALL {
        println!("   {:<16} {}", metric.key(), metric.label().dimmed());
    }

    println!();
    println!("{}", "Presets".bold().cyan());
    for preset in Preset::ALL {
        println!("   {:<16} {}", preset.as_str(), preset.request(10).label().dimmed());
    }

    Ok(())
}
