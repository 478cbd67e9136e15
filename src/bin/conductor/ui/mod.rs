//! TUI widgets for the conductor

mod scope;
mod spectrum;
mod stage;
mod status;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub use scope::render_scope;
pub use spectrum::{render_spectrum, SPECTRUM_BARS};
pub use stage::{render_stage, stage_block};
pub use status::{render_status, AudioStats, StatusInfo};

/// Screen regions
pub struct Areas {
    pub status: Rect,
    pub stage: Rect,
    pub scope: Rect,
    pub spectrum: Rect,
    pub help: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Status bar
            Constraint::Min(8),     // Stage
            Constraint::Length(10), // Scope + spectrum
            Constraint::Length(1),  // Help bar
        ])
        .split(area);

    let monitor = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    Areas {
        status: rows[0],
        stage: rows[1],
        scope: monitor[0],
        spectrum: monitor[1],
        help: rows[3],
    }
}

pub const HELP: &str =
    " [Mouse L/R] drag markers  [1-8] lanes  [r/R] root  [s] scale  [e] edit  [a] all  [h] hands  [Tab] lane  [Q] quit";
