//! Musical vocabulary: note names, intensity, and the scale quantizer.

/// Note names, frequencies, and pitch-derived velocity.
pub mod notes;
/// Scale table and nearest-in-scale quantization.
pub mod scale;

pub use notes::{midi_to_freq, midi_to_note, pitch_to_intensity, velocity_for};
pub use scale::{quantize, Scale};
