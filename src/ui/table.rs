use colored::*;

use crate::core::system_monitor::{ProcessMetric, ProcessRecord, RankedView};

use super::formatters::{format_process_value, format_size};

const NAME_WIDTH: usize = 28;

/// Render a ranked view as plain table lines (no color).
pub fn ranked_table_lines(view: &RankedView) -> Vec<String> {
    let metric = view.request.metric;
    let mut lines = vec![header_line(metric)];
    lines.extend(view.processes.iter().map(|p| row_line(metric, p)));
    lines
}

fn header_line(metric: ProcessMetric) -> String {
    format!(
        "{:>7}  {:<width$}  {:<10}  {:>6}  {:>6}  {:>10}  {:>12}",
        "PID",
        "NAME",
        "STATUS",
        "CPU%",
        "MEM%",
        "RSS",
        metric.label(),
        width = NAME_WIDTH
    )
}

fn row_line(metric: ProcessMetric, p: &ProcessRecord) -> String {
    format!(
        "{:>7}  {:<width$}  {:<10}  {:>6.1}  {:>6.1}  {:>10}  {:>12}",
        p.pid,
        truncate(&p.name, NAME_WIDTH),
        p.status.as_str(),
        p.cpu_percent,
        p.memory_percent,
        format_size(p.memory_bytes),
        format_process_value(metric, p),
        width = NAME_WIDTH
    )
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut out: String = name.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Print a ranked view to stdout
pub fn print_ranked_table(view: &RankedView) {
    println!("{}", view.request.label().bold().cyan());

    if view.is_empty() {
        println!("{}", "  No matching processes".dimmed());
        return;
    }

    let mut lines = ranked_table_lines(view).into_iter();
    if let Some(header) = lines.next() {
        println!("{}", header.bold());
    }
    for (i, line) in lines.enumerate() {
        if i == 0 {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }
}
