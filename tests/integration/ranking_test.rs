use taskpulse::core::system_monitor::{
    rank, rank_named, IoCounters, Preset, ProcessFilter, ProcessMetric, ProcessRecord,
    ProcessStatus, RankDirection, RankingRequest,
};
use taskpulse::TaskpulseError;

use super::support::process;

fn pids(view: &taskpulse::core::system_monitor::RankedView) -> Vec<u32> {
    view.processes.iter().map(|p| p.pid).collect()
}

#[test]
fn test_equal_cpu_broken_by_pid_among_running() {
    let processes = vec![
        process(2, 90.0, ProcessStatus::Running),
        process(3, 10.0, ProcessStatus::Stopped),
        process(1, 90.0, ProcessStatus::Running),
    ];
    let view = rank_named(
        &processes,
        "cpu",
        RankDirection::Top,
        2,
        Some(ProcessFilter::status(ProcessStatus::Running)),
    )
    .unwrap();
    assert_eq!(pids(&view), vec![1, 2]);
}

#[test]
fn test_count_above_available_returns_all() {
    let processes: Vec<_> = (1..=4)
        .map(|pid| process(pid, pid as f32, ProcessStatus::Sleeping))
        .collect();
    let view = rank(&processes, &RankingRequest::top(ProcessMetric::Cpu, 20));
    assert_eq!(pids(&view), vec![4, 3, 2, 1]);
}

#[test]
fn test_empty_snapshot_gives_empty_view() {
    for preset in Preset::ALL {
        assert!(rank(&[], &preset.request(5)).is_empty());
    }
}

#[test]
fn test_filter_matching_nothing() {
    let processes = vec![process(1, 1.0, ProcessStatus::Running)];
    let view = rank(&processes, &Preset::Stopped.request(5));
    assert!(view.is_empty());
}

#[test]
fn test_compound_io_must_be_projected() {
    let err = rank_named(&[], "io_counters", RankDirection::Top, 5, None).unwrap_err();
    match err {
        TaskpulseError::InvalidMetric { name, reason } => {
            assert_eq!(name, "io_counters");
            assert!(reason.contains("io_read_bytes"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_io_total_projection() {
    let with_io = |pid, read, write| ProcessRecord {
        io: Some(IoCounters {
            read_bytes: read,
            write_bytes: write,
        }),
        ..ProcessRecord::new(pid, "io")
    };
    let processes = vec![with_io(1, 100, 0), with_io(2, 10, 200), ProcessRecord::new(3, "none")];

    let view = rank_named(&processes, "io_total_bytes", RankDirection::Top, 5, None).unwrap();
    assert_eq!(pids(&view), vec![2, 1]);
}

#[test]
fn test_threshold_filter_like_high_cpu() {
    let processes = vec![
        process(1, 9.9, ProcessStatus::Running),
        process(2, 10.0, ProcessStatus::Running),
        process(3, 35.0, ProcessStatus::Sleeping),
    ];
    let request = RankingRequest::bottom(ProcessMetric::Pid, 10).with_filter(ProcessFilter::Above {
        metric: ProcessMetric::Cpu,
        threshold: 10.0,
    });
    assert_eq!(pids(&rank(&processes, &request)), vec![3]);
}

#[test]
fn test_rank_is_deterministic() {
    let processes: Vec<_> = (1..=30)
        .map(|pid| process(pid, (pid % 4) as f32, ProcessStatus::Running))
        .collect();
    let request = RankingRequest::top(ProcessMetric::Cpu, 7);
    assert_eq!(rank(&processes, &request), rank(&processes, &request));

    let mut reversed = processes.clone();
    reversed.reverse();
    assert_eq!(pids(&rank(&reversed, &request)), pids(&rank(&processes, &request)));
}
