/*
Note Names, Frequencies and Intensity
=====================================

MIDI numbers pitches 0-127 in semitones. Middle C is 60 and A440 is 69:

    note_number = 12 * (octave + 1) + pitch_class

so octave numbering is anchored with MIDI 60 in octave 4 and MIDI 0 in
octave -1. Names are rendered lowercase with sharps ("c4", "f#3", "a4").

Intensity
---------

Louder notes for higher hands. A pitch inside the intensity window maps
linearly to [0, 1]:

    intensity(p) = clamp((p - 36) / (84 - 36), 0, 1)

and velocity follows it:

    velocity(p) = clamp(round(20 + 100 * intensity(p)), 1, 127)

so C2 and below play at 20, C6 and above at 120.
*/

/// Pitch class names, sharps only.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Lower edge of the intensity window (C2).
pub const INTENSITY_LOW: f64 = 36.0;
/// Upper edge of the intensity window (C6).
pub const INTENSITY_HIGH: f64 = 84.0;

/// Pitch class (0-11) of a MIDI note.
#[inline]
pub fn pitch_class(note: i32) -> u8 {
    note.rem_euclid(12) as u8
}

/// Lowercase note name with octave, e.g. `midi_to_note(60) == "c4"`.
pub fn midi_to_note(note: u8) -> String {
    let name = NOTE_NAMES[pitch_class(note as i32) as usize];
    let octave = (note as i32).div_euclid(12) - 1;
    format!("{}{}", name, octave).to_lowercase()
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Normalized loudness for a pitch, 0.0 at C2 and below, 1.0 at C6 and above.
#[inline]
pub fn pitch_to_intensity(pitch: f64) -> f64 {
    ((pitch - INTENSITY_LOW) / (INTENSITY_HIGH - INTENSITY_LOW)).clamp(0.0, 1.0)
}

/// Note-On velocity for a pitch.
#[inline]
pub fn velocity_for(pitch: u8) -> u8 {
    let v = (20.0 + 100.0 * pitch_to_intensity(pitch as f64)).round();
    v.clamp(1.0, 127.0) as u8
}
