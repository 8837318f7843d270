use std::collections::HashSet;

use sysinfo::{
    Components, CpuRefreshKind, Disk, Disks, MemoryRefreshKind, Networks, Pid, Process,
    ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System, UpdateKind, Users,
};

use crate::error::{Result, TaskpulseError};
use crate::platform::sensors;

use super::catalog::MetricName;
use super::process::{IoCounters, ProcessRecord, ProcessStatus};
use super::provider::{collect_records, MetricsProvider, ProcessLookup};
use super::snapshot::MetricSnapshot;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Component labels that identify a CPU package/core sensor.
const CPU_SENSOR_HINTS: [&str; 5] = ["coretemp", "package", "cpu", "tctl", "k10temp"];

/// Reads one catalog metric from already-refreshed provider state.
type MetricReader = fn(&SysinfoProvider) -> Option<f64>;

/// Catalog metric -> reader. Every catalog entry has exactly one reader.
const READERS: &[(MetricName, MetricReader)] = &[
    (MetricName::Cpu, read_cpu),
    (MetricName::Memory, read_memory),
    (MetricName::Disk, read_disk_usage),
    (MetricName::NetSent, read_net_sent),
    (MetricName::NetRecv, read_net_recv),
    (MetricName::NetTotal, read_net_total),
    (MetricName::Processes, read_process_count),
    (MetricName::Threads, read_thread_count),
    (MetricName::Battery, read_battery_percent),
    (MetricName::Swap, read_swap),
    (MetricName::DiskRead, read_disk_read),
    (MetricName::DiskWrite, read_disk_write),
    (MetricName::CpuTemp, read_cpu_temperature),
    (MetricName::BatteryTime, read_battery_minutes),
    (MetricName::NetErrors, read_net_errors),
    (MetricName::NetDrops, read_net_drops),
    (MetricName::CpuFreq, read_cpu_frequency),
    (MetricName::CpuFreqMin, read_cpu_frequency_min),
    (MetricName::CpuFreqMax, read_cpu_frequency_max),
    (MetricName::VmemTotal, read_vmem_total),
    (MetricName::VmemAvailable, read_vmem_available),
    (MetricName::DiskTotal, read_disk_total),
    (MetricName::DiskFree, read_disk_free),
];

fn reader_for(metric: MetricName) -> Option<MetricReader> {
    READERS
        .iter()
        .find(|(name, _)| *name == metric)
        .map(|(_, reader)| *reader)
}

/// Which sysinfo handle a metric needs refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Subsystem {
    Cpu,
    Memory,
    Disks,
    Networks,
    Components,
    Processes,
    Battery,
    Sysfs,
}

fn subsystem(metric: MetricName) -> Subsystem {
    match metric {
        MetricName::Cpu | MetricName::CpuFreq => Subsystem::Cpu,
        MetricName::Memory
        | MetricName::Swap
        | MetricName::VmemTotal
        | MetricName::VmemAvailable => Subsystem::Memory,
        MetricName::Disk
        | MetricName::DiskRead
        | MetricName::DiskWrite
        | MetricName::DiskTotal
        | MetricName::DiskFree => Subsystem::Disks,
        MetricName::NetSent
        | MetricName::NetRecv
        | MetricName::NetTotal
        | MetricName::NetErrors => Subsystem::Networks,
        MetricName::CpuTemp => Subsystem::Components,
        MetricName::Processes | MetricName::Threads => Subsystem::Processes,
        MetricName::Battery | MetricName::BatteryTime => Subsystem::Battery,
        MetricName::NetDrops | MetricName::CpuFreqMin | MetricName::CpuFreqMax => {
            Subsystem::Sysfs
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BatteryReading {
    percent: Option<f64>,
    minutes_left: Option<f64>,
}

/// [`MetricsProvider`] backed by sysinfo, the battery crate and a few
/// procfs/sysfs reads.
pub struct SysinfoProvider {
    system: System,
    components: Components,
    disks: Disks,
    networks: Networks,
    users: Users,
    battery: BatteryReading,
    /// Set when this tick's system sample already refreshed the process table
    processes_fresh: bool,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());

        Self {
            system: System::new_with_specifics(refresh_kind),
            components: Components::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            users: Users::new_with_refreshed_list(),
            battery: BatteryReading::default(),
            processes_fresh: false,
        }
    }

    /// Take the baseline CPU measurement so the first tick reports real usage.
    ///
    /// sysinfo computes CPU usage as a delta between two refreshes.
    pub fn prime(&mut self) {
        self.system.refresh_cpu_usage();
        self.refresh_processes();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    }

    fn refresh(&mut self, subsystem: Subsystem) {
        match subsystem {
            Subsystem::Cpu => self.system.refresh_cpu_specifics(CpuRefreshKind::everything()),
            Subsystem::Memory => self.system.refresh_memory(),
            Subsystem::Disks => self.disks.refresh(true),
            Subsystem::Networks => self.networks.refresh(true),
            Subsystem::Components => self.components.refresh(true),
            Subsystem::Processes => {
                self.refresh_processes();
                self.processes_fresh = true;
            }
            Subsystem::Battery => self.battery = read_battery(),
            Subsystem::Sysfs => {}
        }
    }

    fn refresh_processes(&mut self) {
        let kind = ProcessRefreshKind::nothing()
            .with_cpu()
            .with_memory()
            .with_disk_usage()
            .with_tasks()
            .with_user(UpdateKind::OnlyIfNotSet);
        self.system
            .refresh_processes_specifics(ProcessesToUpdate::All, true, kind);
    }

    fn record_for(&self, process: &Process, total_memory: u64) -> ProcessRecord {
        let memory = process.memory();
        let disk = process.disk_usage();
        ProcessRecord {
            pid: process.pid().as_u32(),
            name: process.name().to_string_lossy().to_string(),
            cpu_percent: process.cpu_usage(),
            memory_percent: if total_memory > 0 {
                (memory as f64 / total_memory as f64 * 100.0) as f32
            } else {
                0.0
            },
            memory_bytes: memory,
            thread_count: thread_count(process),
            status: map_status(process.status()),
            start_time: process.start_time(),
            io: io_counters(disk.total_read_bytes, disk.total_written_bytes, || {
                self.can_read_io(process)
            }),
            user: process
                .user_id()
                .and_then(|uid| self.users.get_user_by_id(uid))
                .map(|user| user.name().to_string()),
        }
    }

    /// Whether zero I/O counters for `process` are a real reading.
    #[cfg(target_os = "linux")]
    fn can_read_io(&self, process: &Process) -> bool {
        std::fs::File::open(format!("/proc/{}/io", process.pid())).is_ok()
    }

    /// Whether zero I/O counters for `process` are a real reading.
    #[cfg(not(target_os = "linux"))]
    fn can_read_io(&self, process: &Process) -> bool {
        let own_uid = sysinfo::get_current_pid()
            .ok()
            .and_then(|pid| self.system.process(pid))
            .and_then(Process::user_id);
        matches!((own_uid, process.user_id()), (Some(own), Some(uid)) if own == uid)
    }

    fn root_disk(&self) -> Option<&Disk> {
        let list = self.disks.list();
        list.iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .or_else(|| {
                list.iter()
                    .find(|d| d.mount_point().to_string_lossy().eq_ignore_ascii_case("C:\\"))
            })
            .or_else(|| list.first())
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoProvider {
    fn sample_system_metrics(&mut self, selected: &[MetricName]) -> Result<MetricSnapshot> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(TaskpulseError::provider_unreachable(
                "sysinfo does not support this platform",
            ));
        }

        let mut refreshed = HashSet::new();
        for metric in selected {
            let needed = subsystem(*metric);
            if refreshed.insert(needed) {
                self.refresh(needed);
            }
        }

        let mut builder = MetricSnapshot::builder(chrono::Utc::now().timestamp(), selected);
        for metric in selected {
            let reading = reader_for(*metric).and_then(|read| read(self));
            if reading.is_none() {
                log::trace!("Metric {} unavailable on this host", metric.key());
            }
            builder.record(*metric, reading);
        }
        Ok(builder.build())
    }

    fn sample_process_metrics(&mut self) -> Result<Vec<ProcessRecord>> {
        // A second refresh within the same tick would shrink the CPU window
        if !std::mem::take(&mut self.processes_fresh) {
            self.refresh_processes();
        }

        let pids: Vec<Pid> = self.system.processes().keys().copied().collect();
        if pids.is_empty() {
            return Err(TaskpulseError::provider_unreachable(
                "process table is empty (is /proc mounted and readable?)",
            ));
        }

        let total_memory = self.system.total_memory();
        let (records, vanished) = collect_records(pids.iter().map(|pid| pid.as_u32()), |pid| {
            match self.system.process(Pid::from_u32(pid)) {
                Some(process) if process.status() != sysinfo::ProcessStatus::Dead => {
                    ProcessLookup::Found(self.record_for(process, total_memory))
                }
                _ => ProcessLookup::Vanished,
            }
        });
        if vanished > 0 {
            log::debug!("{} process(es) vanished during sampling", vanished);
        }
        Ok(records)
    }
}

fn map_status(status: sysinfo::ProcessStatus) -> ProcessStatus {
    use sysinfo::ProcessStatus as Sys;
    match status {
        Sys::Run => ProcessStatus::Running,
        Sys::Sleep | Sys::Waking | Sys::Wakekill => ProcessStatus::Sleeping,
        Sys::Idle => ProcessStatus::Idle,
        Sys::Stop => ProcessStatus::Stopped,
        Sys::Zombie => ProcessStatus::Zombie,
        Sys::Dead => ProcessStatus::Dead,
        Sys::UninterruptibleDiskSleep | Sys::LockBlocked => ProcessStatus::DiskSleep,
        Sys::Tracing => ProcessStatus::Tracing,
        Sys::Parked => ProcessStatus::Parked,
        _ => ProcessStatus::Unknown,
    }
}

/// sysinfo reports unreadable counters as zero; `readable` tells the two apart
/// and is only consulted for all-zero readings.
fn io_counters(read_bytes: u64, write_bytes: u64, readable: impl FnOnce() -> bool) -> Option<IoCounters> {
    if read_bytes == 0 && write_bytes == 0 && !readable() {
        return None;
    }
    Some(IoCounters {
        read_bytes,
        write_bytes,
    })
}

fn thread_count(process: &Process) -> Option<u32> {
    process.tasks().map(|tasks| tasks.len().max(1) as u32)
}

fn percent(used: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| used as f64 / total as f64 * 100.0)
}

fn read_battery() -> BatteryReading {
    use battery::units::{ratio::percent, time::minute};

    let manager = match battery::Manager::new() {
        Ok(manager) => manager,
        Err(e) => {
            log::trace!("Battery subsystem unavailable: {}", e);
            return BatteryReading::default();
        }
    };
    let battery = manager
        .batteries()
        .ok()
        .and_then(|mut batteries| batteries.next())
        .and_then(|maybe| maybe.ok());

    match battery {
        Some(battery) => BatteryReading {
            percent: Some(battery.state_of_charge().get::<percent>() as f64),
            minutes_left: battery
                .time_to_empty()
                .map(|t| t.get::<minute>().floor() as f64),
        },
        None => BatteryReading::default(),
    }
}

fn read_cpu(p: &SysinfoProvider) -> Option<f64> {
    (!p.system.cpus().is_empty()).then(|| p.system.global_cpu_usage() as f64)
}

fn read_cpu_frequency(p: &SysinfoProvider) -> Option<f64> {
    let cpus = p.system.cpus();
    if cpus.is_empty() {
        return None;
    }
    let total: u64 = cpus.iter().map(|cpu| cpu.frequency()).sum();
    let average = total as f64 / cpus.len() as f64;
    (average > 0.0).then_some(average)
}

fn read_cpu_frequency_min(_: &SysinfoProvider) -> Option<f64> {
    sensors::cpu_frequency_bounds().map(|(min, _)| min)
}

fn read_cpu_frequency_max(_: &SysinfoProvider) -> Option<f64> {
    sensors::cpu_frequency_bounds().map(|(_, max)| max)
}

fn read_memory(p: &SysinfoProvider) -> Option<f64> {
    percent(p.system.used_memory(), p.system.total_memory())
}

fn read_swap(p: &SysinfoProvider) -> Option<f64> {
    percent(p.system.used_swap(), p.system.total_swap())
}

fn read_vmem_total(p: &SysinfoProvider) -> Option<f64> {
    let total = p.system.total_memory();
    (total > 0).then(|| total as f64 / BYTES_PER_MB)
}

fn read_vmem_available(p: &SysinfoProvider) -> Option<f64> {
    (p.system.total_memory() > 0).then(|| p.system.available_memory() as f64 / BYTES_PER_MB)
}

fn read_disk_usage(p: &SysinfoProvider) -> Option<f64> {
    let disk = p.root_disk()?;
    let total = disk.total_space();
    percent(total.saturating_sub(disk.available_space()), total)
}

fn read_disk_total(p: &SysinfoProvider) -> Option<f64> {
    p.root_disk().map(|d| d.total_space() as f64 / BYTES_PER_GB)
}

fn read_disk_free(p: &SysinfoProvider) -> Option<f64> {
    p.root_disk().map(|d| d.available_space() as f64 / BYTES_PER_GB)
}

fn read_disk_read(p: &SysinfoProvider) -> Option<f64> {
    let disks = p.disks.list();
    (!disks.is_empty()).then(|| {
        disks
            .iter()
            .map(|d| d.usage().total_read_bytes)
            .sum::<u64>() as f64
    })
}

fn read_disk_write(p: &SysinfoProvider) -> Option<f64> {
    let disks = p.disks.list();
    (!disks.is_empty()).then(|| {
        disks
            .iter()
            .map(|d| d.usage().total_written_bytes)
            .sum::<u64>() as f64
    })
}

fn sum_networks(p: &SysinfoProvider, f: impl Fn(&sysinfo::NetworkData) -> u64) -> Option<f64> {
    if p.networks.is_empty() {
        return None;
    }
    Some(p.networks.values().map(f).sum::<u64>() as f64)
}

fn read_net_sent(p: &SysinfoProvider) -> Option<f64> {
    sum_networks(p, |n| n.total_transmitted())
}

fn read_net_recv(p: &SysinfoProvider) -> Option<f64> {
    sum_networks(p, |n| n.total_received())
}

fn read_net_total(p: &SysinfoProvider) -> Option<f64> {
    sum_networks(p, |n| n.total_transmitted() + n.total_received())
}

fn read_net_errors(p: &SysinfoProvider) -> Option<f64> {
    sum_networks(p, |n| {
        n.total_errors_on_received() + n.total_errors_on_transmitted()
    })
}

fn read_net_drops(_: &SysinfoProvider) -> Option<f64> {
    sensors::network_drops().map(|drops| drops as f64)
}

fn read_process_count(p: &SysinfoProvider) -> Option<f64> {
    let count = p.system.processes().len();
    (count > 0).then_some(count as f64)
}

fn read_thread_count(p: &SysinfoProvider) -> Option<f64> {
    let mut any = false;
    let mut total = 0u64;
    for count in p.system.processes().values().filter_map(thread_count) {
        any = true;
        total += u64::from(count);
    }
    any.then_some(total as f64)
}

fn read_cpu_temperature(p: &SysinfoProvider) -> Option<f64> {
    p.components
        .iter()
        .filter(|c| {
            let label = c.label().to_ascii_lowercase();
            CPU_SENSOR_HINTS.iter().any(|hint| label.contains(hint))
        })
        .find_map(|c| c.temperature())
        .map(f64::from)
}

fn read_battery_percent(p: &SysinfoProvider) -> Option<f64> {
    p.battery.percent
}

fn read_battery_minutes(p: &SysinfoProvider) -> Option<f64> {
    p.battery.minutes_left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalog_metric_has_reader() {
        for metric in MetricName::all() {
            assert!(reader_for(metric).is_some(), "no reader for {}", metric.key());
        }
        assert_eq!(READERS.len(), MetricName::all().count());
    }

    #[test]
    fn test_percent_guards_zero_total() {
        assert_eq!(percent(5, 0), None);
        assert_eq!(percent(25, 100), Some(25.0));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(sysinfo::ProcessStatus::Run), ProcessStatus::Running);
        assert_eq!(map_status(sysinfo::ProcessStatus::Stop), ProcessStatus::Stopped);
        assert_eq!(map_status(sysinfo::ProcessStatus::Zombie), ProcessStatus::Zombie);
        assert_eq!(map_status(sysinfo::ProcessStatus::Unknown(99)), ProcessStatus::Unknown);
    }

    #[test]
    fn test_unreadable_io_is_missing_not_zero() {
        use crate::core::system_monitor::{rank, ProcessMetric, RankingRequest};

        assert_eq!(io_counters(0, 0, || false), None);
        assert_eq!(
            io_counters(0, 0, || true),
            Some(IoCounters {
                read_bytes: 0,
                write_bytes: 0
            })
        );
        let counters = io_counters(512, 0, || panic!("nonzero counters are always readable"));
        assert_eq!(counters.map(|io| io.read_bytes), Some(512));

        let records = vec![
            ProcessRecord {
                io: io_counters(0, 0, || false),
                ..ProcessRecord::new(1, "other-user")
            },
            ProcessRecord {
                io: io_counters(0, 0, || true),
                ..ProcessRecord::new(2, "own-idle")
            },
            ProcessRecord {
                io: counters,
                ..ProcessRecord::new(3, "own-busy")
            },
        ];
        let view = rank(&records, &RankingRequest::bottom(ProcessMetric::IoReadBytes, 10));
        let pids: Vec<_> = view.processes.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![2, 3]);
    }

    #[test]
    fn test_snapshot_rectangular_on_live_host() {
        let mut provider = SysinfoProvider::new();
        let selected: Vec<_> = MetricName::all().collect();
        let snapshot = provider.sample_system_metrics(&selected).unwrap();
        assert_eq!(snapshot.len(), selected.len());
        for metric in &selected {
            assert!(snapshot.contains(*metric));
        }
    }

    #[test]
    fn test_current_process_sampled() {
        let mut provider = SysinfoProvider::new();
        let records = provider.sample_process_metrics().unwrap();
        let me = std::process::id();
        assert!(records.iter().any(|r| r.pid == me));
    }
}
