//! Headless renderer: one JSON object per line on any writer.

use std::collections::HashMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::core::system_monitor::{
    MetricName, ProcessMetric, ProcessRecord, RankDirection, RankedView, Renderer, Series,
    StopSignal,
};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line<'a> {
    Series {
        metric: MetricName,
        label: &'static str,
        timestamp: i64,
        value: f64,
    },
    Ranked {
        metric: ProcessMetric,
        label: String,
        direction: RankDirection,
        count: usize,
        processes: &'a [ProcessRecord],
    },
}

/// Writes the newest point of each series and every ranked view as JSON lines.
///
/// A series line is only written when the series gained a point since the
/// previous push. The first write error is kept and, if a [`StopSignal`] is
/// attached, stops the loop.
pub struct JsonLinesRenderer<W: Write> {
    writer: W,
    seen_points: HashMap<MetricName, usize>,
    stop: Option<StopSignal>,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            seen_points: HashMap::new(),
            stop: None,
            error: None,
        }
    }

    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, line: &Line<'_>) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, line)
            .map_err(io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            self.fail(e);
        }
    }

    fn fail(&mut self, e: io::Error) {
        log::warn!("JSON stream write failed: {}", e);
        if let Some(stop) = &self.stop {
            stop.stop();
        }
        self.error = Some(e);
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn push_series(&mut self, metric: MetricName, series: Series<'_>) {
        let (count, latest) = series.fold((0usize, None), |(n, _), point| (n + 1, Some(point)));
        let seen = self.seen_points.insert(metric, count).unwrap_or(0);
        if count <= seen {
            return;
        }
        if let Some((timestamp, value)) = latest {
            self.emit(&Line::Series {
                metric,
                label: metric.label(),
                timestamp,
                value,
            });
        }
    }

    fn push_ranked(&mut self, metric: ProcessMetric, view: &RankedView) {
        self.emit(&Line::Ranked {
            metric,
            label: view.request.label(),
            direction: view.request.direction,
            count: view.request.count,
            processes: &view.processes,
        });
    }

    fn tick_complete(&mut self) {
        if self.error.is_none() {
            if let Err(e) = self.writer.flush() {
                self.fail(e);
            }
        }
    }
}
