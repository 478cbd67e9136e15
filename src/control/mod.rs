//! Session control: lane state, MIDI diffing, throttling, and the conductor
//! that ties them to input gestures.

/// MIDI diffing and flush paths.
pub mod emitter;
/// The conductor pipeline.
pub mod engine;
/// Lane and voice state tables.
pub mod state;
/// Input rate limiting.
pub mod throttle;

pub use emitter::MidiEmitter;
pub use engine::{Conductor, LaneView};
pub use state::{LaneBank, LaneState, VoiceControlState};
pub use throttle::InputThrottle;
