use std::time::Duration;

use taskpulse::core::system_monitor::{
    LoopConfig, MetricName, ProcessMetric, ProcessStatus, RankingRequest, RefreshLoop,
    StopSignal, TickStatus,
};
use taskpulse::ui::JsonLinesRenderer;

use super::support::{process, Push, RecordingRenderer, ScriptedProvider};

fn loop_config(metrics: Vec<MetricName>) -> LoopConfig {
    LoopConfig {
        metrics,
        rankings: vec![RankingRequest::top(ProcessMetric::Cpu, 2)],
        interval: Duration::from_millis(1),
        max_ticks: None,
    }
}

fn processes() -> Vec<taskpulse::core::system_monitor::ProcessRecord> {
    vec![
        process(10, 5.0, ProcessStatus::Running),
        process(11, 50.0, ProcessStatus::Sleeping),
        process(12, 25.0, ProcessStatus::Running),
    ]
}

#[test]
fn test_battery_missing_on_first_and_third_tick() {
    let mut provider = ScriptedProvider::new(processes());
    provider.battery_on = vec![2];
    let mut refresh = RefreshLoop::new(
        provider,
        loop_config(vec![MetricName::Cpu, MetricName::Battery]),
    );
    let mut renderer = RecordingRenderer::default();

    let statuses: Vec<_> = (0..3).map(|_| refresh.tick(&mut renderer).status).collect();
    assert_eq!(statuses, vec![TickStatus::Completed; 3]);

    // Every snapshot still carries the battery key
    for snapshot in refresh.store().iter() {
        assert!(snapshot.contains(MetricName::Battery));
    }
    let battery: Vec<_> = refresh.store().as_series(MetricName::Battery).collect();
    assert_eq!(battery, vec![(1_700_000_002, 55.0)]);
    assert_eq!(refresh.store().as_series(MetricName::Cpu).count(), 3);
}

#[test]
fn test_unreachable_provider_on_tick_five_of_ten() {
    let mut provider = ScriptedProvider::new(processes());
    provider.unreachable_on = vec![5];
    let mut refresh = RefreshLoop::new(provider, loop_config(vec![MetricName::Cpu]));
    let mut renderer = RecordingRenderer::default();

    for _ in 0..10 {
        refresh.tick(&mut renderer);
    }

    assert_eq!(refresh.store().len(), 9);
    assert_eq!(renderer.ticks(), 9);
    assert_eq!(refresh.stats().abandoned, 1);

    let timestamps: Vec<_> = refresh.store().iter().map(|s| s.timestamp).collect();
    assert!(!timestamps.contains(&1_700_000_005));
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_series_pushed_before_ranking_includes_current_tick() {
    let mut refresh = RefreshLoop::new(
        ScriptedProvider::new(processes()),
        loop_config(vec![MetricName::Cpu]),
    );
    let mut renderer = RecordingRenderer::default();
    refresh.tick(&mut renderer);
    refresh.tick(&mut renderer);

    let second_tick = &renderer.pushes[3..];
    assert_eq!(
        second_tick,
        &[
            Push::Series(
                MetricName::Cpu,
                vec![(1_700_000_001, 10.0), (1_700_000_002, 20.0)]
            ),
            Push::Ranked(ProcessMetric::Cpu, vec![11, 12]),
            Push::TickComplete,
        ]
    );
}

#[test]
fn test_ranking_changes_apply_on_next_tick() {
    let mut refresh = RefreshLoop::new(
        ScriptedProvider::new(processes()),
        loop_config(vec![]),
    );
    let mut renderer = RecordingRenderer::default();
    refresh.tick(&mut renderer);

    refresh.config_mut().rankings = vec![RankingRequest::bottom(ProcessMetric::Cpu, 1)];
    refresh.tick(&mut renderer);

    assert_eq!(renderer.ranked(), vec![&vec![11, 12], &vec![10]]);
}

#[test]
fn test_json_stream_through_loop() {
    let mut config = loop_config(vec![MetricName::Cpu, MetricName::Memory]);
    config.max_ticks = Some(2);
    let mut refresh = RefreshLoop::new(ScriptedProvider::new(processes()), config);
    let mut renderer = JsonLinesRenderer::new(Vec::new());

    let stats = refresh.run_blocking(&mut renderer, &StopSignal::new());
    assert_eq!(stats.completed, 2);
    assert!(renderer.take_error().is_none());

    let output = String::from_utf8(renderer.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    // cpu + memory + ranked, twice
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0]["kind"], "series");
    assert_eq!(lines[2]["kind"], "ranked");
    assert_eq!(lines[3]["metric"], "cpu");
    assert_eq!(lines[3]["value"], 20.0);
}

#[tokio::test]
async fn test_async_run_honours_max_ticks() {
    let mut config = loop_config(vec![MetricName::Cpu]);
    config.interval = Duration::from_millis(5);
    config.max_ticks = Some(3);
    let mut refresh = RefreshLoop::new(ScriptedProvider::new(processes()), config);
    let mut renderer = RecordingRenderer::default();

    let stats = refresh.run(&mut renderer, &StopSignal::new()).await;
    assert_eq!(stats.attempted, 3);
    assert_eq!(renderer.ticks(), 3);
}
