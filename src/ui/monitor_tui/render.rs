use ratatui::{
    prelude::*,
    widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table},
};

use super::app::DashboardState;
use super::widgets::{metric_chart, percent_color};
use crate::core::system_monitor::RankedView;
use crate::ui::formatters::{format_metric_value, format_process_value, format_size};

/// Charts per row in the series grid.
const CHARTS_PER_ROW: usize = 3;

/// Main render function
pub fn render_ui(frame: &mut Frame, state: &DashboardState) {
    let area = frame.area();

    let has_charts = !state.metric_order.is_empty();
    let constraints = if has_charts {
        vec![
            Constraint::Length(3),      // Header with latest readings
            Constraint::Percentage(45), // Series charts
            Constraint::Min(8),         // Ranked views
            Constraint::Length(1),      // Footer
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_header(frame, chunks[0], state);
    if has_charts {
        render_charts(frame, chunks[1], state);
        render_rankings(frame, chunks[2], state);
        render_footer(frame, chunks[3]);
    } else {
        render_rankings(frame, chunks[1], state);
        render_footer(frame, chunks[2]);
    }

    if state.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let mut spans = Vec::new();
    for (i, metric) in state.metric_order.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        let value = state.latest(*metric);
        let color = match value {
            Some(v) if metric.is_percent() => percent_color(v),
            Some(_) => Color::White,
            None => Color::DarkGray,
        };
        spans.push(Span::raw(format!("{}: ", metric.label())));
        spans.push(Span::styled(
            format_metric_value(*metric, value),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let title = match &state.preset {
        Some(preset) => format!(" taskpulse │ tick {} │ preset {} ", state.ticks, preset),
        None => format!(" taskpulse │ tick {} ", state.ticks),
    };
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if let Some(notice) = &state.notice {
        block = block.title_bottom(Line::from(format!(" {} ", notice)).fg(Color::Yellow));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_charts(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let rows: Vec<_> = state.metric_order.chunks(CHARTS_PER_ROW).collect();
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows.len() as u32); rows.len()])
        .split(area);

    let empty = Vec::new();
    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, row.len() as u32); row.len()])
            .split(*row_area);

        for (metric, cell) in row.iter().zip(cells.iter()) {
            let points = state.series.get(metric).unwrap_or(&empty);
            frame.render_widget(metric_chart(*metric, points), *cell);
        }
    }
}

fn render_rankings(frame: &mut Frame, area: Rect, state: &DashboardState) {
    if state.views.is_empty() {
        let block = Block::default().title(" Processes ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(" Waiting for data... ").block(block), area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Ratio(1, state.views.len() as u32);
            state.views.len()
        ])
        .split(area);

    for (view, column) in state.views.iter().zip(columns.iter()) {
        render_ranked_view(frame, *column, view);
    }
}

fn render_ranked_view(frame: &mut Frame, area: Rect, view: &RankedView) {
    let block = Block::default()
        .title(format!(" {} [p:preset +/-:count d:direction] ", view.request.label()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Not enough space for header + at least one row
    if inner.height < 2 {
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    let bars = view.bars();
    let data: Vec<(&str, u64)> = bars
        .iter()
        .map(|(label, value)| (label.as_str(), value.max(0.0).round() as u64))
        .collect();
    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .data(&data);
    frame.render_widget(chart, parts[0]);

    let metric = view.request.metric;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let header = Row::new(vec![
        Cell::from("PID").style(bold),
        Cell::from("Name").style(bold),
        Cell::from("Status").style(bold),
        Cell::from("CPU %").style(bold),
        Cell::from("Memory").style(bold),
        Cell::from(metric.label()).style(bold),
    ])
    .height(1);

    let rows: Vec<Row> = view
        .processes
        .iter()
        .map(|proc| {
            Row::new(vec![
                Cell::from(proc.pid.to_string()),
                Cell::from(proc.name.clone()),
                Cell::from(proc.status.as_str()),
                Cell::from(format!("{:.1}%", proc.cpu_percent)),
                Cell::from(format_size(proc.memory_bytes)),
                Cell::from(format_process_value(metric, proc)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Percentage(35),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header);

    frame.render_widget(table, parts[1]);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let help = " q: Quit │ ?: Help │ p: Next preset │ +/-: Count │ d: Top/Bottom ";
    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = r#"
    taskpulse - Help

    Keyboard Shortcuts:
    ─────────────────────────────────────
    q / Esc     Quit the application
    ? / h       Toggle this help screen
    p / Tab     Next process preset
    + / ↑       Rank one more process
    - / ↓       Rank one fewer process
    d           Swap top and bottom ranking

    Press any key to close this help
    "#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::DarkGray));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
