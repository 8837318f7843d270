//! Deterministic top-N / bottom-N selection over a process snapshot.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::process::{ProcessMetric, ProcessRecord, ProcessStatus};
use crate::error::{Result, TaskpulseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankDirection {
    /// Largest values first
    #[default]
    Top,
    /// Smallest values first
    Bottom,
}

impl RankDirection {
    pub fn flipped(self) -> Self {
        match self {
            RankDirection::Top => RankDirection::Bottom,
            RankDirection::Bottom => RankDirection::Top,
        }
    }
}

impl fmt::Display for RankDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankDirection::Top => f.write_str("top"),
            RankDirection::Bottom => f.write_str("bottom"),
        }
    }
}

impl FromStr for RankDirection {
    type Err = TaskpulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "desc" | "high" => Ok(RankDirection::Top),
            "bottom" | "asc" | "low" => Ok(RankDirection::Bottom),
            other => Err(TaskpulseError::config(format!(
                "Unknown ranking direction '{}' (expected top or bottom)",
                other
            ))),
        }
    }
}

/// Predicate applied before ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessFilter {
    /// Keep processes whose status is one of these
    Status(Vec<ProcessStatus>),
    /// Keep processes whose metric is strictly greater than the threshold
    Above { metric: ProcessMetric, threshold: f64 },
    /// Keep processes matching every inner filter
    All(Vec<ProcessFilter>),
}

impl ProcessFilter {
    pub fn status(status: ProcessStatus) -> Self {
        ProcessFilter::Status(vec![status])
    }

    /// Both filters must match.
    pub fn and(self, other: ProcessFilter) -> Self {
        match self {
            ProcessFilter::All(mut filters) => {
                filters.push(other);
                ProcessFilter::All(filters)
            }
            first => ProcessFilter::All(vec![first, other]),
        }
    }

    pub fn matches(&self, record: &ProcessRecord) -> bool {
        match self {
            ProcessFilter::Status(allowed) => allowed.contains(&record.status),
            ProcessFilter::Above { metric, threshold } => metric
                .value(record)
                .map(|v| v > *threshold)
                .unwrap_or(false),
            ProcessFilter::All(filters) => filters.iter().all(|f| f.matches(record)),
        }
    }
}

impl fmt::Display for ProcessFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessFilter::Status(allowed) => {
                let names: Vec<_> = allowed.iter().map(|s| s.as_str()).collect();
                write!(f, "status={}", names.join("|"))
            }
            ProcessFilter::Above { metric, threshold } => write!(f, "{}>{}", metric, threshold),
            ProcessFilter::All(filters) => {
                let parts: Vec<_> = filters.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(" & "))
            }
        }
    }
}

/// What to rank, in which direction, and how many to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRequest {
    pub metric: ProcessMetric,
    pub direction: RankDirection,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ProcessFilter>,
}

impl RankingRequest {
    pub const MIN_COUNT: usize = 1;
    pub const MAX_COUNT: usize = 20;

    /// Build a request; `count` is clamped to `1..=20`.
    pub fn new(metric: ProcessMetric, direction: RankDirection, count: usize) -> Self {
        Self {
            metric,
            direction,
            count: count.clamp(Self::MIN_COUNT, Self::MAX_COUNT),
            filter: None,
        }
    }

    pub fn top(metric: ProcessMetric, count: usize) -> Self {
        Self::new(metric, RankDirection::Top, count)
    }

    pub fn bottom(metric: ProcessMetric, count: usize) -> Self {
        Self::new(metric, RankDirection::Bottom, count)
    }

    pub fn with_filter(mut self, filter: ProcessFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Chart title, e.g. `Top 5 by cpu (status=running)`.
    pub fn label(&self) -> String {
        let direction = match self.direction {
            RankDirection::Top => "Top",
            RankDirection::Bottom => "Bottom",
        };
        match &self.filter {
            Some(filter) => format!("{} {} by {} ({})", direction, self.count, self.metric, filter),
            None => format!("{} {} by {}", direction, self.count, self.metric),
        }
    }
}

/// Ordered, bounded result of one ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedView {
    pub request: RankingRequest,
    pub processes: Vec<ProcessRecord>,
}

impl RankedView {
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Chart-ready `(name, value)` bars in rank order.
    pub fn bars(&self) -> Vec<(String, f64)> {
        self.processes
            .iter()
            .map(|p| {
                let value = self.request.metric.value(p).unwrap_or_default();
                (p.name.clone(), value)
            })
            .collect()
    }
}

/// Sort key with NaN pinned to the bottom of the order and -0.0 folded into 0.0.
fn sort_key(value: f64) -> f64 {
    if value.is_nan() {
        f64::NEG_INFINITY
    } else if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Rank a process snapshot.
///
/// Records failing the filter, or lacking the ranked field, are dropped.
/// The rest are ordered by the metric (descending for top, ascending for
/// bottom); equal values are ordered by ascending pid. At most
/// `request.count` records are returned.
pub fn rank(processes: &[ProcessRecord], request: &RankingRequest) -> RankedView {
    let mut keyed: Vec<(f64, &ProcessRecord)> = processes
        .iter()
        .filter(|p| request.filter.as_ref().map_or(true, |f| f.matches(p)))
        .filter_map(|p| request.metric.value(p).map(|v| (sort_key(v), p)))
        .collect();

    keyed.sort_by(|(ka, a), (kb, b)| {
        let by_value = match request.direction {
            RankDirection::Top => kb.total_cmp(ka),
            RankDirection::Bottom => ka.total_cmp(kb),
        };
        match by_value {
            Ordering::Equal => a.pid.cmp(&b.pid),
            other => other,
        }
    });
    keyed.truncate(request.count);

    RankedView {
        request: request.clone(),
        processes: keyed.into_iter().map(|(_, p)| p.clone()).collect(),
    }
}

/// Rank by a metric given as a string, failing with `InvalidMetric` when it
/// is not a numeric process field.
pub fn rank_named(
    processes: &[ProcessRecord],
    metric: &str,
    direction: RankDirection,
    count: usize,
    filter: Option<ProcessFilter>,
) -> Result<RankedView> {
    let metric: ProcessMetric = metric.parse()?;
    let mut request = RankingRequest::new(metric, direction, count);
    request.filter = filter;
    Ok(rank(processes, &request))
}

/// Percentage above which a process counts as busy.
pub const BUSY_THRESHOLD_PERCENT: f64 = 10.0;

/// Named process views from the filter selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    #[default]
    HighCpu,
    HighMemory,
    HighIo,
    HighThreads,
    LowCpu,
    LowMemory,
    /// Only processes above [`BUSY_THRESHOLD_PERCENT`] CPU
    BusyCpu,
    /// Only processes above [`BUSY_THRESHOLD_PERCENT`] memory
    BusyMemory,
    Running,
    Stopped,
    All,
}

impl Preset {
    pub const ALL: [Preset; 11] = [
        Preset::HighCpu,
        Preset::HighMemory,
        Preset::HighIo,
        Preset::HighThreads,
        Preset::LowCpu,
        Preset::LowMemory,
        Preset::BusyCpu,
        Preset::BusyMemory,
        Preset::Running,
        Preset::Stopped,
        Preset::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::HighCpu => "high-cpu",
            Preset::HighMemory => "high-memory",
            Preset::HighIo => "high-io",
            Preset::HighThreads => "high-threads",
            Preset::LowCpu => "low-cpu",
            Preset::LowMemory => "low-memory",
            Preset::BusyCpu => "busy-cpu",
            Preset::BusyMemory => "busy-memory",
            Preset::Running => "running",
            Preset::Stopped => "stopped",
            Preset::All => "all",
        }
    }

    /// The preset after this one, wrapping around.
    pub fn next(self) -> Self {
        let idx = Preset::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Preset::ALL[(idx + 1) % Preset::ALL.len()]
    }

    /// Status and `all` presets list processes in pid order.
    pub fn request(self, count: usize) -> RankingRequest {
        match self {
            Preset::HighCpu => RankingRequest::top(ProcessMetric::Cpu, count),
            Preset::HighMemory => RankingRequest::top(ProcessMetric::Memory, count),
            Preset::HighIo => RankingRequest::top(ProcessMetric::IoReadBytes, count),
            Preset::HighThreads => RankingRequest::top(ProcessMetric::Threads, count),
            Preset::LowCpu => RankingRequest::bottom(ProcessMetric::Cpu, count),
            Preset::LowMemory => RankingRequest::bottom(ProcessMetric::Memory, count),
            Preset::BusyCpu => RankingRequest::top(ProcessMetric::Cpu, count).with_filter(
                ProcessFilter::Above {
                    metric: ProcessMetric::Cpu,
                    threshold: BUSY_THRESHOLD_PERCENT,
                },
            ),
            Preset::BusyMemory => RankingRequest::top(ProcessMetric::Memory, count).with_filter(
                ProcessFilter::Above {
                    metric: ProcessMetric::Memory,
                    threshold: BUSY_THRESHOLD_PERCENT,
                },
            ),
            Preset::Running => RankingRequest::bottom(ProcessMetric::Pid, count)
                .with_filter(ProcessFilter::status(ProcessStatus::Running)),
            Preset::Stopped => RankingRequest::bottom(ProcessMetric::Pid, count)
                .with_filter(ProcessFilter::status(ProcessStatus::Stopped)),
            Preset::All => RankingRequest::bottom(ProcessMetric::Pid, count),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = TaskpulseError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Preset::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| TaskpulseError::config(format!("Unknown preset '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system_monitor::IoCounters;

    fn proc(pid: u32, cpu: f32, status: ProcessStatus) -> ProcessRecord {
        ProcessRecord {
            cpu_percent: cpu,
            status,
            ..ProcessRecord::new(pid, format!("p{}", pid))
        }
    }

    fn pids(view: &RankedView) -> Vec<u32> {
        view.processes.iter().map(|p| p.pid).collect()
    }

    #[test]
    fn test_tie_broken_by_pid_and_status_filtered() {
        let processes = vec![
            proc(2, 90.0, ProcessStatus::Running),
            proc(3, 10.0, ProcessStatus::Stopped),
            proc(1, 90.0, ProcessStatus::Running),
        ];
        let request = RankingRequest::top(ProcessMetric::Cpu, 2)
            .with_filter(ProcessFilter::status(ProcessStatus::Running));

        let view = rank(&processes, &request);
        assert_eq!(pids(&view), vec![1, 2]);
    }

    #[test]
    fn test_bottom_is_ascending() {
        let processes = vec![
            proc(1, 30.0, ProcessStatus::Running),
            proc(2, 5.0, ProcessStatus::Running),
            proc(3, 5.0, ProcessStatus::Sleeping),
            proc(4, 0.0, ProcessStatus::Sleeping),
        ];
        let view = rank(&processes, &RankingRequest::bottom(ProcessMetric::Cpu, 3));
        assert_eq!(pids(&view), vec![4, 2, 3]);
    }

    #[test]
    fn test_count_larger_than_input() {
        let processes = vec![proc(5, 1.0, ProcessStatus::Running), proc(6, 2.0, ProcessStatus::Running)];
        let view = rank(&processes, &RankingRequest::top(ProcessMetric::Cpu, 20));
        assert_eq!(pids(&view), vec![6, 5]);
    }

    #[test]
    fn test_empty_input() {
        let view = rank(&[], &RankingRequest::top(ProcessMetric::Memory, 5));
        assert!(view.is_empty());
    }

    #[test]
    fn test_count_clamped_to_bounds() {
        assert_eq!(RankingRequest::top(ProcessMetric::Cpu, 0).count, 1);
        assert_eq!(RankingRequest::top(ProcessMetric::Cpu, 99).count, 20);
    }

    #[test]
    fn test_records_without_field_dropped() {
        let mut with_io = proc(1, 0.0, ProcessStatus::Running);
        with_io.io = Some(IoCounters {
            read_bytes: 10,
            write_bytes: 0,
        });
        let without_io = proc(2, 0.0, ProcessStatus::Running);
        let view = rank(
            &[without_io, with_io],
            &RankingRequest::top(ProcessMetric::IoReadBytes, 5),
        );
        assert_eq!(pids(&view), vec![1]);
    }

    #[test]
    fn test_nan_sorts_last_for_top() {
        let processes = vec![
            proc(1, f32::NAN, ProcessStatus::Running),
            proc(2, 1.0, ProcessStatus::Running),
        ];
        let view = rank(&processes, &RankingRequest::top(ProcessMetric::Cpu, 2));
        assert_eq!(pids(&view), vec![2, 1]);
    }

    #[test]
    fn test_threshold_filter() {
        let processes = vec![
            proc(1, 10.0, ProcessStatus::Running),
            proc(2, 10.5, ProcessStatus::Running),
        ];
        let request = RankingRequest::top(ProcessMetric::Cpu, 5).with_filter(ProcessFilter::Above {
            metric: ProcessMetric::Cpu,
            threshold: 10.0,
        });
        assert_eq!(pids(&rank(&processes, &request)), vec![2]);
    }

    #[test]
    fn test_rank_named_rejects_unknown() {
        let err = rank_named(&[], "colour", RankDirection::Top, 3, None).unwrap_err();
        assert!(matches!(err, TaskpulseError::InvalidMetric { .. }));
        assert!(rank_named(&[], "io", RankDirection::Top, 3, None).is_err());
        assert!(rank_named(&[], "threads", RankDirection::Top, 3, None).is_ok());
    }

    #[test]
    fn test_presets() {
        let processes = vec![
            proc(9, 1.0, ProcessStatus::Stopped),
            proc(3, 2.0, ProcessStatus::Running),
            proc(7, 3.0, ProcessStatus::Running),
        ];
        assert_eq!(pids(&rank(&processes, &Preset::Running.request(10))), vec![3, 7]);
        assert_eq!(pids(&rank(&processes, &Preset::All.request(2))), vec![3, 7]);
        assert_eq!(pids(&rank(&processes, &Preset::HighCpu.request(1))), vec![7]);
        assert_eq!("high_cpu".parse::<Preset>().unwrap(), Preset::HighCpu);
        assert_eq!(Preset::All.next(), Preset::HighCpu);
    }

    #[test]
    fn test_busy_presets_use_strict_threshold() {
        let processes = vec![
            proc(1, 0.0, ProcessStatus::Sleeping),
            proc(2, 10.0, ProcessStatus::Running),
            proc(3, 35.0, ProcessStatus::Running),
            proc(4, 10.1, ProcessStatus::Running),
        ];
        assert_eq!(pids(&rank(&processes, &Preset::BusyCpu.request(10))), vec![3, 4]);

        let mut heavy = proc(5, 0.0, ProcessStatus::Sleeping);
        heavy.memory_percent = 12.0;
        let view = rank(&[heavy, proc(6, 50.0, ProcessStatus::Running)], &Preset::BusyMemory.request(10));
        assert_eq!(pids(&view), vec![5]);
        assert_eq!("busy_cpu".parse::<Preset>().unwrap(), Preset::BusyCpu);
    }

    #[test]
    fn test_label() {
        let request = Preset::Running.request(5);
        assert_eq!(request.label(), "Bottom 5 by pid (status=running)");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_processes() -> impl Strategy<Value = Vec<ProcessRecord>> {
            prop::collection::vec((0.0f32..100.0, any::<bool>()), 0..40).prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (cpu, running))| {
                        let status = if running {
                            ProcessStatus::Running
                        } else {
                            ProcessStatus::Sleeping
                        };
                        // Coarse values so ties actually occur
                        proc(i as u32 + 1, cpu.round() / 10.0, status)
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn length_is_min_of_count_and_filtered(processes in arb_processes(), count in 1usize..=20, filtered in any::<bool>()) {
                let mut request = RankingRequest::top(ProcessMetric::Cpu, count);
                if filtered {
                    request = request.with_filter(ProcessFilter::status(ProcessStatus::Running));
                }
                let eligible = processes
                    .iter()
                    .filter(|p| !filtered || p.status == ProcessStatus::Running)
                    .count();
                prop_assert_eq!(rank(&processes, &request).len(), count.min(eligible));
            }

            #[test]
            fn ordered_with_pid_tie_break(processes in arb_processes(), count in 1usize..=20, bottom in any::<bool>()) {
                let direction = if bottom { RankDirection::Bottom } else { RankDirection::Top };
                let view = rank(&processes, &RankingRequest::new(ProcessMetric::Cpu, direction, count));
                for pair in view.processes.windows(2) {
                    let (a, b) = (&pair[0], &pair[1]);
                    if a.cpu_percent == b.cpu_percent {
                        prop_assert!(a.pid < b.pid);
                    } else if bottom {
                        prop_assert!(a.cpu_percent < b.cpu_percent);
                    } else {
                        prop_assert!(a.cpu_percent > b.cpu_percent);
                    }
                }
            }

            #[test]
            fn ranking_is_deterministic(processes in arb_processes(), count in 1usize..=20, bottom in any::<bool>()) {
                let direction = if bottom { RankDirection::Bottom } else { RankDirection::Top };
                let request = RankingRequest::new(ProcessMetric::Cpu, direction, count);
                let mut shuffled = processes.clone();
                shuffled.reverse();
                let once = rank(&processes, &request);
                prop_assert_eq!(&once, &rank(&processes, &request));
                prop_assert_eq!(&once, &rank(&shuffled, &request));
            }
        }
    }
}
