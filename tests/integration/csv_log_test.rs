use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use taskpulse::core::system_monitor::{
    LoopConfig, MetricName, MetricsLog, NullRenderer, ProcessStatus, RefreshLoop,
};

use super::support::{process, ScriptedProvider};

fn refresh_with_log(log: MetricsLog) -> RefreshLoop<ScriptedProvider> {
    let config = LoopConfig {
        metrics: vec![MetricName::Disk],
        rankings: Vec::new(),
        interval: Duration::from_millis(1),
        max_ticks: None,
    };
    RefreshLoop::new(
        ScriptedProvider::new(vec![process(1, 1.0, ProcessStatus::Running)]),
        config,
    )
    .with_log(log)
}

#[test]
fn test_one_row_per_completed_tick() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usage.csv");

    let mut refresh = refresh_with_log(MetricsLog::new(&path));
    refresh.provider_mut().unreachable_on = vec![2];
    for _ in 0..3 {
        refresh.tick(&mut NullRenderer);
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Timestamp,CPU Usage,Memory Usage");
    assert!(lines[1].ends_with(",10.0,40.0"));
    assert!(lines[2].ends_with(",30.0,40.0"));
    assert!(content.ends_with('\n'));
}

#[test]
fn test_existing_log_is_appended_not_truncated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usage.csv");

    refresh_with_log(MetricsLog::new(&path)).tick(&mut NullRenderer);
    refresh_with_log(MetricsLog::new(&path)).tick(&mut NullRenderer);

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("Timestamp").count(), 1);
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_rows_parse_back_with_csv_reader() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usage.csv");
    let mut refresh = refresh_with_log(MetricsLog::new(&path));
    refresh.tick(&mut NullRenderer);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[1], "CPU Usage");

    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(record[0].len(), "2024-01-01 00:00:00".len());
    assert_eq!(&record[2], "40.0");
}
