//! Oscilloscope widget for the selected lane's time tap

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Render the scope; samples are drawn oldest to newest.
pub fn render_scope(frame: &mut Frame, area: Rect, title: &str, samples: &[f32]) {
    let block = Block::default()
        .title(format!(" Scope {title} "))
        .borders(Borders::ALL);

    let len = samples.len().max(1) as f64;
    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 / len, s as f64))
        .collect();

    // Preview tones peak near 0.09; zoom so they are visible.
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let range = if peak > 0.0 { (peak as f64 * 1.2).clamp(0.05, 1.0) } else { 1.0 };

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-range, range])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
