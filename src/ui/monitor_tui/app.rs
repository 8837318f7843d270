use std::collections::BTreeMap;
use std::io;
use std::mem;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::system_monitor::{
    LoopStats, MetricName, MetricsProvider, Preset, ProcessMetric, RankedView, RankingRequest,
    RefreshLoop, Renderer, Series, StopSignal, TickReport, TickStatus,
};

use super::event_handler::MonitorEvent;
use super::render::render_ui;

/// Dashboard state fed by the refresh loop.
pub struct DashboardState {
    /// Chart points per selected metric, in selection order
    pub series: BTreeMap<MetricName, Vec<(f64, f64)>>,
    pub metric_order: Vec<MetricName>,
    /// Views from the last completed tick
    pub views: Vec<RankedView>,
    pending_views: Vec<RankedView>,
    pub rankings: Vec<RankingRequest>,
    rankings_changed: bool,
    pub preset: Option<Preset>,
    /// Completed sampling ticks; re-ranks do not count
    pub ticks: u64,
    /// Shown in the header after an abandoned tick
    pub notice: Option<String>,
    pub should_quit: bool,
    pub show_help: bool,
}

impl DashboardState {
    pub fn new(metrics: Vec<MetricName>, rankings: Vec<RankingRequest>) -> Self {
        Self {
            series: BTreeMap::new(),
            metric_order: metrics,
            views: Vec::new(),
            pending_views: Vec::new(),
            rankings,
            rankings_changed: false,
            preset: None,
            ticks: 0,
            notice: None,
            should_quit: false,
            show_help: false,
        }
    }

    /// Most recent value of a charted metric.
    pub fn latest(&self, metric: MetricName) -> Option<f64> {
        self.series
            .get(&metric)
            .and_then(|points| points.last())
            .map(|(_, v)| *v)
    }

    pub fn record_report(&mut self, report: &TickReport) {
        if report.is_completed() {
            self.ticks += 1;
        }
        self.notice = match report.status {
            TickStatus::Abandoned => Some(format!(
                "tick {} skipped: {}",
                report.tick,
                report.error.as_deref().unwrap_or("provider unreachable")
            )),
            TickStatus::Completed => report
                .log_error
                .as_ref()
                .map(|e| format!("CSV log: {}", e)),
        };
    }

    /// Ranking requests changed by key presses since the last call.
    pub fn take_ranking_update(&mut self) -> Option<Vec<RankingRequest>> {
        mem::take(&mut self.rankings_changed).then(|| self.rankings.clone())
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Quit => self.should_quit = true,
            MonitorEvent::ToggleHelp => self.show_help = !self.show_help,
            MonitorEvent::NextPreset => {
                let count = self
                    .rankings
                    .first()
                    .map_or(RankingRequest::MAX_COUNT / 2, |r| r.count);
                let preset = self.preset.map_or(Preset::default(), Preset::next);
                self.preset = Some(preset);
                self.rankings = vec![preset.request(count)];
                self.rankings_changed = true;
            }
            MonitorEvent::IncreaseCount => self.adjust_count(1),
            MonitorEvent::DecreaseCount => self.adjust_count(-1),
            MonitorEvent::FlipDirection => {
                for request in &mut self.rankings {
                    request.direction = request.direction.flipped();
                }
                self.rankings_changed = true;
            }
            MonitorEvent::None => {}
        }
    }

    fn adjust_count(&mut self, delta: isize) {
        for request in &mut self.rankings {
            request.count = request
                .count
                .saturating_add_signed(delta)
                .clamp(RankingRequest::MIN_COUNT, RankingRequest::MAX_COUNT);
        }
        self.rankings_changed = true;
    }
}

impl Renderer for DashboardState {
    fn push_series(&mut self, metric: MetricName, series: Series<'_>) {
        self.series.insert(metric, series.to_points());
    }

    fn push_ranked(&mut self, _metric: ProcessMetric, view: &RankedView) {
        self.pending_views.push(view.clone());
    }

    fn tick_complete(&mut self) {
        self.views = mem::take(&mut self.pending_views);
    }
}

/// Run the dashboard until the user quits or `stop` fires.
///
/// The event loop drives the refresh loop's ticks on the configured interval
/// and re-ranks the previous tick's processes when a key changes the rankings.
pub fn run_dashboard<P: MetricsProvider>(
    refresh: &mut RefreshLoop<P>,
    preset: Option<Preset>,
    stop: &StopSignal,
) -> Result<LoopStats> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = event_loop(&mut terminal, refresh, preset, stop);

    // Restore terminal even when the loop failed
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result?;
    Ok(refresh.stats())
}

fn event_loop<P: MetricsProvider>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    refresh: &mut RefreshLoop<P>,
    preset: Option<Preset>,
    stop: &StopSignal,
) -> Result<()> {
    let config = refresh.config().clone();
    let tick_rate = config.interval;
    let mut state = DashboardState::new(config.metrics, config.rankings);
    state.preset = preset;

    let report = refresh.tick(&mut state);
    state.record_report(&report);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| render_ui(frame, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("Event poll failed")? {
            if let Event::Key(key) = event::read().context("Event read failed")? {
                if key.kind == KeyEventKind::Press {
                    let monitor_event = if state.show_help {
                        // Any key closes the help overlay
                        MonitorEvent::ToggleHelp
                    } else {
                        MonitorEvent::from_key(key)
                    };
                    state.handle_event(monitor_event);
                }
            }
        }

        if state.should_quit {
            stop.stop();
        }
        if stop.is_stopped() {
            break;
        }

        // Ranking changes re-rank the last process list; only the interval samples
        if let Some(rankings) = state.take_ranking_update() {
            refresh.config_mut().rankings = rankings;
            refresh.rerank(&mut state);
        }

        if last_tick.elapsed() >= tick_rate {
            let report = refresh.tick(&mut state);
            state.record_report(&report);
            last_tick = Instant::now();
        }
    }

    Ok(())
}
