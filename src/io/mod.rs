//! External interfaces: MIDI wire messages, output sinks, and input feedback.

#[cfg(feature = "rtrb")]
pub mod input;
pub mod midi;
pub mod output;

pub use midi::MidiEvent;
pub use output::{open_output, MemorySink, MidiSink, NullSink};
