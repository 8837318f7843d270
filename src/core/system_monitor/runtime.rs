//! The refresh loop: one serialized tick per interval.
//!
//! Each tick pulls a system snapshot and a process list from the provider,
//! appends the snapshot to the [`SampleStore`], re-ranks the processes for
//! every configured request and pushes the results to a [`Renderer`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use super::catalog::MetricName;
use super::csv_log::{MetricsLog, LOGGED_METRICS};
use super::history::SampleStore;
use super::process::ProcessRecord;
use super::provider::{MetricsProvider, Renderer};
use super::ranker::{rank, RankedView, RankingRequest};

/// Granularity of stop checks while the blocking loop sleeps.
const STOP_POLL: Duration = Duration::from_millis(50);

/// What the loop samples and ranks each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// System metrics to sample and chart
    pub metrics: Vec<MetricName>,
    /// One ranked view per request, every tick
    pub rankings: Vec<RankingRequest>,
    pub interval: Duration,
    /// Stop after this many tick attempts (headless runs)
    pub max_ticks: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            metrics: MetricName::DEFAULT_SELECTION.to_vec(),
            rankings: vec![RankingRequest::top(
                super::process::ProcessMetric::Cpu,
                10,
            )],
            interval: Duration::from_secs(1),
            max_ticks: None,
        }
    }
}

/// Cooperative stop flag shared between the loop and whoever ends the session.
///
/// Checked at the top of every tick; a tick already running completes.
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`stop`](Self::stop) has been called.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so wait_for cannot observe a closed channel
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Snapshot appended, rankings pushed
    Completed,
    /// Provider unreachable; nothing appended or pushed
    Abandoned,
}

/// Summary of one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// 1-based attempt number
    pub tick: u64,
    pub status: TickStatus,
    /// Requested metrics the provider marked unavailable
    pub unavailable: Vec<MetricName>,
    pub ranked_views: usize,
    pub error: Option<String>,
    /// CSV log failure; sampling and ranking are unaffected
    pub log_error: Option<String>,
    pub elapsed: Duration,
}

impl TickReport {
    pub fn is_completed(&self) -> bool {
        self.status == TickStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub attempted: u64,
    pub completed: u64,
    pub abandoned: u64,
}

/// Owns the provider, the session's [`SampleStore`] and the optional CSV log.
pub struct RefreshLoop<P: MetricsProvider> {
    provider: P,
    store: SampleStore,
    config: LoopConfig,
    log: Option<MetricsLog>,
    stats: LoopStats,
    last_views: Vec<RankedView>,
    /// Process list of the most recent completed tick, kept for re-ranking
    last_processes: Vec<ProcessRecord>,
}

impl<P: MetricsProvider> RefreshLoop<P> {
    pub fn new(provider: P, config: LoopConfig) -> Self {
        Self {
            provider,
            store: SampleStore::new(),
            config,
            log: None,
            stats: LoopStats::default(),
            last_views: Vec::new(),
            last_processes: Vec::new(),
        }
    }

    pub fn with_log(mut self, log: MetricsLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Change what the next tick samples or ranks.
    pub fn config_mut(&mut self) -> &mut LoopConfig {
        &mut self.config
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Ranked views from the most recent completed tick.
    pub fn last_views(&self) -> &[RankedView] {
        &self.last_views
    }

    /// Re-run the configured rankings over the last completed tick's
    /// processes and push only the views.
    ///
    /// Nothing is sampled or appended, so the store and the tick cadence are
    /// untouched. Returns the number of views pushed.
    pub fn rerank<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> usize {
        let views: Vec<RankedView> = self
            .config
            .rankings
            .iter()
            .map(|request| rank(&self.last_processes, request))
            .collect();

        for view in &views {
            renderer.push_ranked(view.request.metric, view);
        }
        renderer.tick_complete();

        log::debug!(
            "Re-ranked {} process(es) into {} view(s)",
            self.last_processes.len(),
            views.len()
        );
        self.last_views = views;
        self.last_views.len()
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Charted metrics plus whatever the CSV log needs.
    fn sampled_metrics(&self) -> Vec<MetricName> {
        let mut metrics = self.config.metrics.clone();
        if self.log.is_some() {
            for metric in LOGGED_METRICS {
                if !metrics.contains(&metric) {
                    metrics.push(metric);
                }
            }
        }
        metrics
    }

    /// Run one sampling cycle and push its results to `renderer`.
    pub fn tick<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> TickReport {
        let started = Instant::now();
        self.stats.attempted += 1;
        let tick = self.stats.attempted;

        let selected = self.sampled_metrics();
        let sampled = self
            .provider
            .sample_system_metrics(&selected)
            .and_then(|snapshot| Ok((snapshot, self.provider.sample_process_metrics()?)));

        let (snapshot, processes) = match sampled {
            Ok(sampled) => sampled,
            Err(e) => {
                self.stats.abandoned += 1;
                log::warn!("Tick {} abandoned: {}", tick, e);
                return TickReport {
                    tick,
                    status: TickStatus::Abandoned,
                    unavailable: Vec::new(),
                    ranked_views: 0,
                    error: Some(e.to_string()),
                    log_error: None,
                    elapsed: started.elapsed(),
                };
            }
        };

        let unavailable: Vec<MetricName> = snapshot
            .entries()
            .filter(|(_, value)| !value.is_available())
            .map(|(metric, _)| metric)
            .collect();

        // Append before ranking so readers never see a ranking without its snapshot
        self.store.append(snapshot);

        let log_error = match (&self.log, self.store.latest()) {
            (Some(log), Some(latest)) => log.append(latest).err().map(|e| {
                log::warn!("Failed to write {}: {}", log.path().display(), e);
                e.to_string()
            }),
            _ => None,
        };

        let views: Vec<RankedView> = self
            .config
            .rankings
            .iter()
            .map(|request| rank(&processes, request))
            .collect();

        for metric in &self.config.metrics {
            renderer.push_series(*metric, self.store.as_series(*metric));
        }
        for view in &views {
            debug_assert!(view.len() <= view.request.count);
            renderer.push_ranked(view.request.metric, view);
        }
        renderer.tick_complete();

        self.stats.completed += 1;
        self.last_views = views;
        let process_count = processes.len();
        self.last_processes = processes;

        let elapsed = started.elapsed();
        log::debug!(
            "Tick {} completed in {:?}: {} processes, {} unavailable metric(s)",
            tick,
            elapsed,
            process_count,
            unavailable.len()
        );

        TickReport {
            tick,
            status: TickStatus::Completed,
            unavailable,
            ranked_views: self.last_views.len(),
            error: None,
            log_error,
            elapsed,
        }
    }

    fn reached_max_ticks(&self) -> bool {
        self.config
            .max_ticks
            .is_some_and(|max| self.stats.attempted >= max)
    }

    /// Tick on a tokio interval until `stop` fires (or `max_ticks` is hit).
    ///
    /// Ticks that would have fired while a slow tick was still running are
    /// skipped, not replayed.
    pub async fn run<R: Renderer + ?Sized>(&mut self, renderer: &mut R, stop: &StopSignal) -> LoopStats {
        let period = self.config.interval;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log::info!("Refresh loop started (interval {:?})", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop.stopped() => break,
            }
            if stop.is_stopped() || self.reached_max_ticks() {
                break;
            }

            let report = self.tick(renderer);
            if report.elapsed > period {
                log::warn!(
                    "Tick {} took {:?}, longer than the {:?} interval",
                    report.tick,
                    report.elapsed,
                    period
                );
            }
        }

        log::info!(
            "Refresh loop stopped: {} completed, {} abandoned",
            self.stats.completed,
            self.stats.abandoned
        );
        self.stats
    }

    /// Same loop as [`run`](Self::run) on the calling thread, without a runtime.
    pub fn run_blocking<R: Renderer + ?Sized>(&mut self, renderer: &mut R, stop: &StopSignal) -> LoopStats {
        let period = self.config.interval;
        log::info!("Refresh loop started (interval {:?})", period);

        while !stop.is_stopped() && !self.reached_max_ticks() {
            let report = self.tick(renderer);
            if report.elapsed > period {
                log::warn!(
                    "Tick {} took {:?}, longer than the {:?} interval",
                    report.tick,
                    report.elapsed,
                    period
                );
                continue;
            }

            let deadline = Instant::now() + (period - report.elapsed);
            while !stop.is_stopped() {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                std::thread::sleep(STOP_POLL.min(deadline - now));
            }
        }

        log::info!(
            "Refresh loop stopped: {} completed, {} abandoned",
            self.stats.completed,
            self.stats.abandoned
        );
        self.stats
    }
}
