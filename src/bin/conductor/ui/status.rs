//! Status bar widget - session parameters, devices, and output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Level statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Peak from the scope window, RMS as reported by the lane's time tap.
    pub fn new(scope: &[f32], rms: f32) -> Self {
        let peak = scope.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        Self { peak, rms }
    }
}

/// Everything the status bar shows
pub struct StatusInfo<'a> {
    pub lanes: usize,
    pub root: &'a str,
    pub scale: &'a str,
    pub edit_count: usize,
    pub select_all: bool,
    pub hand_tracking: bool,
    pub midi_out: Option<&'a str>,
    pub midi_in: Option<&'a str>,
    /// `None` when no audio device is open
    pub sample_rate: Option<f32>,
    pub stats: AudioStats,
}

pub fn render_status(frame: &mut Frame, area: Rect, info: &StatusInfo) {
    let block = Block::default()
        .title(" lane conductor ")
        .borders(Borders::ALL);

    let group = if info.select_all {
        "all".to_string()
    } else {
        info.edit_count.to_string()
    };
    let input = if info.hand_tracking { "hands" } else { "pointer" };
    let audio = match info.sample_rate {
        Some(sr) => format!("{:.1}kHz  ", sr / 1000.0),
        None => "no audio  ".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Lanes: {}  ", info.lanes),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", info.root.to_uppercase(), info.scale),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("Edit: {group}  "), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("Input: {input}  "),
            Style::default().fg(if info.hand_tracking {
                Color::Green
            } else {
                Color::White
            }),
        ),
        Span::styled(
            format!("Out: {}  ", info.midi_out.unwrap_or("none")),
            Style::default().fg(if info.midi_out.is_some() {
                Color::Green
            } else {
                Color::Red
            }),
        ),
        Span::styled(
            format!("In: {}  ", info.midi_in.unwrap_or("none")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(audio, Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", info.stats.peak, info.stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
