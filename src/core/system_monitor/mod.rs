//! System monitoring core functionality.
//!
//! Sampling (`collector`), the per-session time series (`history`),
//! process ranking (`ranker`) and the refresh loop that ties them
//! together (`runtime`).

mod catalog;
mod collector;
pub mod csv_log;
mod history;
mod process;
mod provider;
mod ranker;
pub mod runtime;
mod snapshot;

pub use catalog::MetricName;
pub use collector::SysinfoProvider;
pub use csv_log::MetricsLog;
pub use history::{SampleStore, Series};
pub use process::{IoCounters, ProcessMetric, ProcessRecord, ProcessStatus};
pub use provider::{collect_records, MetricsProvider, NullRenderer, ProcessLookup, Renderer};
pub use ranker::{rank, rank_named, Preset, ProcessFilter, RankDirection, RankedView, RankingRequest};
pub use runtime::{LoopConfig, LoopStats, RefreshLoop, StopSignal, TickReport, TickStatus};
pub use snapshot::{MetricSnapshot, MetricValue, SnapshotBuilder};
