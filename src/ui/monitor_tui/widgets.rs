use ratatui::{
    prelude::*,
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

use crate::core::system_monitor::MetricName;
use crate::ui::formatters::{format_clock, format_metric_value};

/// Get color for a percentage value
pub fn percent_color(value: f64) -> Color {
    match value {
        v if v < 50.0 => Color::Cyan,
        v if v < 75.0 => Color::LightYellow,
        v if v < 90.0 => Color::LightRed,
        _ => Color::Red,
    }
}

/// Y bounds for a series: 0..100 for percentages, padded min..max otherwise.
pub fn y_bounds(metric: MetricName, points: &[(f64, f64)]) -> [f64; 2] {
    if metric.is_percent() {
        return [0.0, 100.0];
    }
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((max - min) * 0.1).max(1.0);
    [(min - pad).max(0.0), max + pad]
}

/// X bounds covering the series timestamps, never zero-width.
pub fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    match (points.first(), points.last()) {
        (Some((first, _)), Some((last, _))) if last > first => [*first, *last],
        (Some((t, _)), _) => [t - 1.0, t + 1.0],
        _ => [0.0, 1.0],
    }
}

/// Line chart of one metric's series.
pub fn metric_chart(metric: MetricName, points: &[(f64, f64)]) -> Chart<'_> {
    let color = match points.last() {
        Some((_, v)) if metric.is_percent() => percent_color(*v),
        _ => Color::Cyan,
    };
    let [x_min, x_max] = x_bounds(points);
    let [y_min, y_max] = y_bounds(metric, points);

    let current = format_metric_value(metric, points.last().map(|(_, v)| *v));
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(points);

    Chart::new(vec![dataset])
        .block(
            Block::default()
                .title(format!(" {} [{}] ", metric.label(), current))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([x_min, x_max])
                .labels(vec![
                    format_clock(x_min as i64),
                    format_clock(x_max as i64),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_min, y_max])
                .labels(vec![format!("{:.0}", y_min), format!("{:.0}", y_max)]),
        )
}
