use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use taskpulse::cli::build_cli;
use taskpulse::commands::apply_overrides;
use taskpulse::core::config::Config;
use taskpulse::core::system_monitor::{
    MetricName, Preset, ProcessFilter, ProcessMetric, ProcessStatus, RankDirection,
};
use taskpulse::TaskpulseError;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_empty_and_corrupt_files_give_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    fs::write(&path, "").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    fs::write(&path, "{ not json").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "count": 5, "metrics": ["battery"] }"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.count, 5);
    assert_eq!(config.interval_ms, 1000);
    assert_eq!(config.resolve().unwrap().metrics, vec![MetricName::Battery]);
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let mut config = Config::default();
    config.set("preset", "high-memory").unwrap();
    config.set("log_csv", "/tmp/usage.csv").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.log_csv, Some(PathBuf::from("/tmp/usage.csv")));
}

#[test]
fn test_labels_accepted_as_metric_names() {
    let config = Config {
        metrics: vec!["CPU Usage (%)".into(), "swap".into(), "cpu".into()],
        ..Config::default()
    };
    assert_eq!(
        config.resolve().unwrap().metrics,
        vec![MetricName::Cpu, MetricName::Swap]
    );
}

#[test]
fn test_invalid_metric_names_the_offender() {
    let config = Config {
        rank: vec!["io".into()],
        ..Config::default()
    };
    assert!(matches!(
        config.resolve(),
        Err(TaskpulseError::InvalidMetric { name, .. }) if name == "io"
    ));
}

#[test]
fn test_flags_override_file_values() {
    let matches = build_cli()
        .try_get_matches_from([
            "taskpulse",
            "stream",
            "--metrics",
            "cpu,net_total",
            "--rank",
            "memory_bytes:bottom",
            "-n",
            "4",
            "--status",
            "running,sleeping",
            "--interval-ms",
            "250",
        ])
        .unwrap();
    let (_, stream) = matches.subcommand().unwrap();

    let mut config = Config {
        interval_ms: 5000,
        ..Config::default()
    };
    apply_overrides(&mut config, stream);
    let resolved = config.resolve().unwrap();

    assert_eq!(resolved.metrics, vec![MetricName::Cpu, MetricName::NetTotal]);
    assert_eq!(resolved.interval, Duration::from_millis(250));
    let request = &resolved.rankings[0];
    assert_eq!(request.metric, ProcessMetric::MemoryBytes);
    assert_eq!(request.direction, RankDirection::Bottom);
    assert_eq!(request.count, 4);
    assert_eq!(
        request.filter,
        Some(ProcessFilter::Status(vec![
            ProcessStatus::Running,
            ProcessStatus::Sleeping
        ]))
    );
}

#[test]
fn test_preset_flag_replaces_saved_rankings() {
    let matches = build_cli()
        .try_get_matches_from(["taskpulse", "top", "--preset", "running"])
        .unwrap();
    let (_, top) = matches.subcommand().unwrap();

    let mut config = Config {
        rank: vec!["cpu".into()],
        ..Config::default()
    };
    apply_overrides(&mut config, top);
    let resolved = config.resolve().unwrap();
    assert_eq!(resolved.rankings, vec![Preset::Running.request(10)]);
}

#[test]
fn test_out_of_range_flags_rejected() {
    let matches = build_cli()
        .try_get_matches_from(["taskpulse", "monitor", "-n", "0", "-i", "50"])
        .unwrap();
    let (_, monitor) = matches.subcommand().unwrap();
    let mut config = Config::default();
    apply_overrides(&mut config, monitor);
    assert!(matches!(config.resolve(), Err(TaskpulseError::Config(_))));
}
