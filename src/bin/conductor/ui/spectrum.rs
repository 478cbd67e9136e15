//! Spectrum widget - the selected lane's frequency tap as bars

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

/// Bars requested from the frequency tap each frame
pub const SPECTRUM_BARS: usize = 32;

/// Bar height resolution
const BAR_MAX: u64 = 100;

fn bar_color(level: f32) -> Color {
    match level {
        l if l > 0.75 => Color::Red,
        l if l > 0.45 => Color::Yellow,
        _ => Color::Green,
    }
}

/// Render `levels` (each 0.0..=1.0, low to high frequency) as a bar chart.
pub fn render_spectrum(frame: &mut Frame, area: Rect, title: &str, levels: &[f32]) {
    let block = Block::default()
        .title(format!(" Spectrum {title} "))
        .borders(Borders::ALL);
    let inner = block.inner(area);

    // Stretch bars to fill the panel; at least one cell each
    let count = levels.len().max(1) as u16;
    let bar_width = (inner.width / count).max(1);

    let bars: Vec<Bar> = levels
        .iter()
        .map(|&level| {
            let level = level.clamp(0.0, 1.0);
            Bar::default()
                .value((level * BAR_MAX as f32).round() as u64)
                .text_value(String::new())
                .style(Style::default().fg(bar_color(level)))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(0)
        .max(BAR_MAX);

    frame.render_widget(chart, area);
}
