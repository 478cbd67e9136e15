//! Lane stage widget
//!
//! One column per lane with its note, channel and pan. The dot marks the
//! lane's pitch height; `L`/`R` are the two markers. Lanes flash when a
//! gesture writes to them and fade back.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use lane_conductor::control::LaneView;
use lane_conductor::mapping::{Marker, PitchRange};
use lane_conductor::music::midi_to_note;

/// Block around the stage; the inner rect is the input area.
pub fn stage_block() -> Block<'static> {
    Block::default().title(" Stage ").borders(Borders::ALL)
}

fn highlight_bg(alpha: f32) -> Color {
    let a = alpha.clamp(0.0, 1.0);
    let level = (a * 70.0) as u8;
    Color::Rgb(level / 2, level / 2, level)
}

/// Draw the stage block, its lanes, and the markers.
pub fn render_stage(
    frame: &mut Frame,
    area: Rect,
    lanes: &[LaneView],
    markers: &[(Marker, (f64, f64))],
    selected: usize,
    range: &PitchRange,
) {
    let block = stage_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if lanes.is_empty() || inner.width == 0 || inner.height == 0 {
        return;
    }

    let n = lanes.len() as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..n).map(|_| Constraint::Ratio(1, n)))
        .split(inner);

    for (lane, &col) in lanes.iter().zip(columns.iter()) {
        let title_style = if lane.index == selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let held = match lane.sounding {
            Some(note) => format!("♪ {}", midi_to_note(note)),
            None => "·".to_string(),
        };
        let text = vec![
            Line::styled(format!("{} ch{}", lane.index + 1, lane.channel), title_style),
            Line::from(midi_to_note(lane.pitch)),
            Line::from(format!("pan {}", lane.pan)),
            Line::from(held),
        ];
        let borders = if lane.index == 0 { Borders::NONE } else { Borders::LEFT };
        let para = Paragraph::new(text)
            .block(Block::default().borders(borders))
            .style(Style::default().bg(highlight_bg(lane.highlight)));
        frame.render_widget(para, col);

        // Pitch dot at the lane's current height, offset by pan.
        let t = ((range.high - lane.pitch as f64) / range.span.max(1.0)).clamp(0.0, 1.0);
        let y = col.y + ((col.height.saturating_sub(1)) as f64 * t).round() as u16;
        let pan = lane.pan as f64 / 127.0;
        let x = col.x + ((col.width.saturating_sub(1)) as f64 * pan).round() as u16;
        frame
            .buffer_mut()
            .set_string(x, y, "●", Style::default().fg(Color::Cyan));
    }

    for &(marker, (x, y)) in markers {
        let cx = (x.floor().max(inner.x as f64) as u16).min(inner.right().saturating_sub(1));
        let cy = (y.floor().max(inner.y as f64) as u16).min(inner.bottom().saturating_sub(1));
        let (label, color) = match marker {
            Marker::Left => ("L", Color::LightGreen),
            Marker::Right => ("R", Color::LightMagenta),
        };
        frame.buffer_mut().set_string(
            cx,
            cy,
            label,
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD),
        );
    }
}
