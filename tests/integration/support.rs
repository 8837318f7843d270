use taskpulse::core::system_monitor::{
    MetricName, MetricSnapshot, MetricsProvider, ProcessMetric, ProcessRecord, ProcessStatus,
    RankedView, Renderer, Series,
};
use taskpulse::{Result, TaskpulseError};

/// Provider driven by a per-tick script.
pub struct ScriptedProvider {
    pub tick: i64,
    pub unreachable_on: Vec<i64>,
    pub battery_on: Vec<i64>,
    pub processes: Vec<ProcessRecord>,
}

impl ScriptedProvider {
    pub fn new(processes: Vec<ProcessRecord>) -> Self {
        Self {
            tick: 0,
            unreachable_on: Vec::new(),
            battery_on: Vec::new(),
            processes,
        }
    }
}

impl MetricsProvider for ScriptedProvider {
    fn sample_system_metrics(&mut self, selected: &[MetricName]) -> Result<MetricSnapshot> {
        self.tick += 1;
        if self.unreachable_on.contains(&self.tick) {
            return Err(TaskpulseError::provider_unreachable("access denied"));
        }
        let mut builder = MetricSnapshot::builder(1_700_000_000 + self.tick, selected);
        builder.record(MetricName::Cpu, Some(10.0 * self.tick as f64));
        builder.record(MetricName::Memory, Some(40.0));
        builder.record(MetricName::Processes, Some(self.processes.len() as f64));
        if self.battery_on.contains(&self.tick) {
            builder.record(MetricName::Battery, Some(55.0));
        }
        Ok(builder.build())
    }

    fn sample_process_metrics(&mut self) -> Result<Vec<ProcessRecord>> {
        Ok(self.processes.clone())
    }
}

pub fn process(pid: u32, cpu: f32, status: ProcessStatus) -> ProcessRecord {
    ProcessRecord {
        cpu_percent: cpu,
        status,
        ..ProcessRecord::new(pid, format!("proc-{}", pid))
    }
}

/// What a renderer saw, in push order.
#[derive(Debug, Clone, PartialEq)]
pub enum Push {
    Series(MetricName, Vec<(i64, f64)>),
    Ranked(ProcessMetric, Vec<u32>),
    TickComplete,
}

#[derive(Default)]
pub struct RecordingRenderer {
    pub pushes: Vec<Push>,
}

impl RecordingRenderer {
    pub fn ticks(&self) -> usize {
        self.pushes.iter().filter(|p| **p == Push::TickComplete).count()
    }

    pub fn ranked(&self) -> Vec<&Vec<u32>> {
        self.pushes
            .iter()
            .filter_map(|p| match p {
                Push::Ranked(_, pids) => Some(pids),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn push_series(&mut self, metric: MetricName, series: Series<'_>) {
        self.pushes.push(Push::Series(metric, series.collect()));
    }

    fn push_ranked(&mut self, metric: ProcessMetric, view: &RankedView) {
        self.pushes.push(Push::Ranked(
            metric,
            view.processes.iter().map(|p| p.pid).collect(),
        ));
    }

    fn tick_complete(&mut self) {
        self.pushes.push(Push::TickComplete);
    }
}
