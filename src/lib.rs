//! Gesture-driven MIDI lane conductor.
//!
//! A stage is split into vertical lanes. Dragging a marker (or moving a
//! tracked hand) picks a lane and pan from the horizontal position and a
//! pitch from the vertical one, snaps the pitch to a scale, and sends the
//! change to every lane in the edit group as MIDI. Each lane also has an
//! audio bus with analysis taps for monitoring.

pub mod config;
pub mod control; // Lane state, emitter, throttle, conductor
pub mod error;
pub mod io;
pub mod mapping; // Stage geometry, lane resolution, hand feed
pub mod monitor; // Per-lane audio buses
pub mod music; // Scales and note helpers

pub use config::ConductorConfig;
pub use control::Conductor;
pub use error::{ConductorError, Result};

/// Fixed capacity of every per-lane table.
pub const MAX_LANES: usize = 8;
/// Largest block a bus renders in one pass.
pub const MAX_BLOCK_SIZE: usize = 2048;
/// MIDI channel (1-based) of lane 0 unless configured otherwise.
pub const MIDI_CHANNEL_BASE: u8 = 1;
