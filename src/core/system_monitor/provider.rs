//! Capability seams between the refresh loop and the outside world.

use super::catalog::MetricName;
use super::history::Series;
use super::process::{ProcessMetric, ProcessRecord};
use super::ranker::RankedView;
use super::snapshot::MetricSnapshot;
use crate::error::Result;

/// Source of system and per-process metrics.
///
/// Implementations mark requested metrics they cannot read as unavailable
/// instead of omitting them or failing. An `Err` means the whole subsystem
/// could not be queried (`ProviderUnreachable`) and abandons the tick.
pub trait MetricsProvider {
    fn sample_system_metrics(&mut self, selected: &[MetricName]) -> Result<MetricSnapshot>;

    fn sample_process_metrics(&mut self) -> Result<Vec<ProcessRecord>>;
}

impl<P: MetricsProvider + ?Sized> MetricsProvider for Box<P> {
    fn sample_system_metrics(&mut self, selected: &[MetricName]) -> Result<MetricSnapshot> {
        (**self).sample_system_metrics(selected)
    }

    fn sample_process_metrics(&mut self) -> Result<Vec<ProcessRecord>> {
        (**self).sample_process_metrics()
    }
}

/// Consumer of refreshed data. Fire-and-forget: nothing flows back.
pub trait Renderer {
    /// The full series for one charted system metric.
    fn push_series(&mut self, metric: MetricName, series: Series<'_>);

    /// A ranked process view, never longer than the requested count.
    fn push_ranked(&mut self, metric: ProcessMetric, view: &RankedView);

    /// Called once after every push of a completed tick.
    fn tick_complete(&mut self) {}
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn push_series(&mut self, metric: MetricName, series: Series<'_>) {
        (**self).push_series(metric, series)
    }

    fn push_ranked(&mut self, metric: ProcessMetric, view: &RankedView) {
        (**self).push_ranked(metric, view)
    }

    fn tick_complete(&mut self) {
        (**self).tick_complete()
    }
}

/// Renderer that discards everything (headless sampling, CSV-only runs).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn push_series(&mut self, _metric: MetricName, _series: Series<'_>) {}

    fn push_ranked(&mut self, _metric: ProcessMetric, _view: &RankedView) {}
}

/// Outcome of reading one enumerated process's details.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessLookup {
    Found(ProcessRecord),
    /// The process exited between enumeration and detail read
    Vanished,
}

/// Resolve enumerated pids to records, dropping processes that vanished.
///
/// Returns the records and the number of processes dropped.
pub fn collect_records<I, F>(pids: I, mut lookup: F) -> (Vec<ProcessRecord>, usize)
where
    I: IntoIterator<Item = u32>,
    F: FnMut(u32) -> ProcessLookup,
{
    let mut records = Vec::new();
    let mut vanished = 0;
    for pid in pids {
        match lookup(pid) {
            ProcessLookup::Found(record) => records.push(record),
            ProcessLookup::Vanished => {
                log::trace!("Process {} vanished before its details were read", pid);
                vanished += 1;
            }
        }
    }
    (records, vanished)
}
