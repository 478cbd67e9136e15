//! Audio monitoring: per-lane buses with pan, analysis taps, and preview tones.
//!
//! Nothing here feeds back into the MIDI pipeline; the buses exist so the
//! UI can draw a scope and spectrum per lane and so lanes can be auditioned
//! without an external synth.

/// Frequency- and time-domain analysis taps.
pub mod analyser;
/// Render clock and lane bus graph.
pub mod bus;
/// Equal-power stereo panning.
pub mod panner;
/// Scheduled parameter automation.
pub mod param;
/// Short sine preview voices.
pub mod preview;
/// Lazily populated bus table.
pub mod registry;

pub use analyser::Analyser;
pub use bus::{AudioContext, LaneBus};
pub use panner::{equal_power, normalize_pan, Panner};
pub use param::AudioParam;
pub use registry::BusRegistry;
