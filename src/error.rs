use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConductorError>;

/// Errors surfaced at the edges of the conductor: loading configuration and
/// opening MIDI devices. The mapping pipeline itself never fails; it clamps.
#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("unknown scale: {0}")]
    UnknownScale(String),

    #[error("unknown direction: {0} (expected \"forward\" or \"backward\")")]
    UnknownDirection(String),

    #[error("invalid hand frame: {0}")]
    HandFrame(#[from] serde_json::Error),

    #[error("MIDI init error: {0}")]
    MidiInit(#[from] midir::InitError),

    #[error("no MIDI {direction} port available")]
    NoMidiPort { direction: &'static str },

    #[error("MIDI connect error: {0}")]
    MidiConnect(String),
}
