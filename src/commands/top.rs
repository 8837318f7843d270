//! One-shot ranked process table.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::system_monitor::{NullRenderer, RefreshLoop, SysinfoProvider, TickStatus};
use crate::ui::{format_metric_value, print_ranked_table};

/// Execute the top command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let settings = super::resolve_settings(matches)?;

    let mut provider = SysinfoProvider::new();
    provider.prime();

    let mut refresh = RefreshLoop::new(provider, settings.loop_config);
    if let Some(log) = settings.log {
        refresh = refresh.with_log(log);
    }

    let report = refresh.tick(&mut NullRenderer);
    if report.status == TickStatus::Abandoned {
        return Err(anyhow::anyhow!(
            report.error.unwrap_or_else(|| "provider unreachable".into())
        ))
        .context("Failed to sample processes");
    }

    if let Some(snapshot) = refresh.store().latest() {
        for (metric, value) in snapshot.entries() {
            println!(
                "{:<32} {}",
                metric.label().bold(),
                format_metric_value(metric, value.value())
            );
        }
        println!();
    }

    for view in refresh.last_views() {
        print_ranked_table(view);
        println!();
    }
    Ok(())
}
