//! Monitor command handler.
//!
//! Runs the refresh loop behind the TUI dashboard.

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::system_monitor::{RefreshLoop, StopSignal, SysinfoProvider};
use crate::ui::monitor_tui::run_dashboard;

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let settings = super::resolve_settings(matches)?;

    let mut provider = SysinfoProvider::new();
    provider.prime();

    let mut refresh = RefreshLoop::new(provider, settings.loop_config);
    if let Some(log) = settings.log {
        refresh = refresh.with_log(log);
    }

    let stop = StopSignal::new();
    let stats = run_dashboard(&mut refresh, settings.preset, &stop)
        .context("Failed to run system monitor")?;

    log::info!(
        "Monitor closed after {} tick(s), {} abandoned",
        stats.completed,
        stats.abandoned
    );
    Ok(())
}
