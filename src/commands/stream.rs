//! Headless JSON-lines output (for scripting).

use std::io::{self, ErrorKind};

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::system_monitor::{RefreshLoop, StopSignal, SysinfoProvider};
use crate::ui::JsonLinesRenderer;

/// Execute the stream command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut settings = super::resolve_settings(matches)?;
    settings.loop_config.max_ticks = matches.get_one::<u64>("ticks").copied();

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.stop())
        .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let mut provider = SysinfoProvider::new();
    provider.prime();

    let mut refresh = RefreshLoop::new(provider, settings.loop_config);
    if let Some(log) = settings.log {
        refresh = refresh.with_log(log);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;

    let stdout = io::stdout();
    let mut renderer = JsonLinesRenderer::new(stdout.lock()).with_stop(stop.clone());
    let stats = runtime.block_on(refresh.run(&mut renderer, &stop));

    log::info!(
        "Stream finished: {} tick(s) completed, {} abandoned",
        stats.completed,
        stats.abandoned
    );

    match renderer.take_error() {
        // Downstream reader went away (e.g. `| head`)
        Some(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        Some(e) => Err(e).context("Failed to write JSON stream"),
        None => Ok(()),
    }
}
