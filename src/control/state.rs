//! Per-lane session state.
//!
//! Both tables are fixed-capacity arrays sized to [`MAX_LANES`] with an
//! explicit active length, so changing the lane count never reallocates.
//! Indexing past the active length is a caller bug and panics in debug
//! builds; the resolver never produces such indices.

use std::time::{Duration, Instant};

use crate::MAX_LANES;

/// Pitch and pan shown for one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneState {
    /// MIDI note, 0-127.
    pub pitch: u8,
    /// Stereo position, 0-127 (64 = centre).
    pub pan: u8,
}

impl Default for LaneState {
    fn default() -> Self {
        Self { pitch: 60, pan: 64 }
    }
}

impl LaneState {
    pub fn new(pitch: u8, pan: u8) -> Self {
        Self {
            pitch: pitch.min(127),
            pan: pan.min(127),
        }
    }
}

/// Lane states for the active lanes.
#[derive(Debug, Clone)]
pub struct LaneBank {
    lanes: [LaneState; MAX_LANES],
    len: usize,
}

impl LaneBank {
    /// Bank with `len` default lanes (clamped to `1..=MAX_LANES`).
    pub fn new(len: usize) -> Self {
        Self {
            lanes: [LaneState::default(); MAX_LANES],
            len: len.clamp(1, MAX_LANES),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Change the active length. Lanes that come back into range start from
    /// the default state; lanes that drop out are forgotten.
    pub fn resize(&mut self, len: usize) {
        let len = len.clamp(1, MAX_LANES);
        for lane in self.lanes.iter_mut().skip(len) {
            *lane = LaneState::default();
        }
        self.len = len;
    }

    pub fn get(&self, index: usize) -> Option<&LaneState> {
        self.as_slice().get(index)
    }

    pub fn as_slice(&self) -> &[LaneState] {
        &self.lanes[..self.len]
    }

    /// Set pitch and pan on an active lane.
    pub fn set(&mut self, index: usize, pitch: u8, pan: u8) {
        debug_assert!(index < self.len, "lane {index} out of range");
        if let Some(lane) = self.lanes[..self.len].get_mut(index) {
            *lane = LaneState::new(pitch, pan);
        }
    }

    pub fn set_pitch(&mut self, index: usize, pitch: u8) {
        if let Some(lane) = self.lanes[..self.len].get_mut(index) {
            lane.pitch = pitch.min(127);
        }
    }

    pub fn set_pan(&mut self, index: usize, pan: u8) {
        if let Some(lane) = self.lanes[..self.len].get_mut(index) {
            lane.pan = pan.min(127);
        }
    }
}

/// What has been sent to MIDI per lane, plus highlight timestamps.
///
/// Only the emitter and the highlight marker write here; the spatial mapper
/// never reads it.
#[derive(Debug, Clone)]
pub struct VoiceControlState {
    last_note: [Option<u8>; MAX_LANES],
    last_pan: [Option<u8>; MAX_LANES],
    highlight_at: [Option<Instant>; MAX_LANES],
    len: usize,
}

impl VoiceControlState {
    pub fn new(len: usize) -> Self {
        Self {
            last_note: [None; MAX_LANES],
            last_pan: [None; MAX_LANES],
            highlight_at: [None; MAX_LANES],
            len: len.clamp(1, MAX_LANES),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Change the active length. Lanes beyond the new length are reset;
    /// callers must flush their sounding notes first.
    pub fn resize(&mut self, len: usize) {
        let len = len.clamp(1, MAX_LANES);
        for i in len..MAX_LANES {
            self.reset_lane(i);
        }
        self.len = len;
    }

    fn reset_lane(&mut self, lane: usize) {
        self.last_note[lane] = None;
        self.last_pan[lane] = None;
        self.highlight_at[lane] = None;
    }

    pub fn last_note(&self, lane: usize) -> Option<u8> {
        self.last_note.get(lane).copied().flatten()
    }

    pub fn set_last_note(&mut self, lane: usize, note: Option<u8>) {
        debug_assert!(lane < MAX_LANES);
        if let Some(slot) = self.last_note.get_mut(lane) {
            *slot = note;
        }
    }

    pub fn last_pan(&self, lane: usize) -> Option<u8> {
        self.last_pan.get(lane).copied().flatten()
    }

    pub fn set_last_pan(&mut self, lane: usize, pan: Option<u8>) {
        debug_assert!(lane < MAX_LANES);
        if let Some(slot) = self.last_pan.get_mut(lane) {
            *slot = pan;
        }
    }

    /// Lanes (within `0..len`) with a note currently sounding.
    pub fn active_notes(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.last_note[..self.len]
            .iter()
            .enumerate()
            .filter_map(|(i, note)| note.map(|n| (i, n)))
    }

    /// Lanes at or beyond `from` with a note still sounding, regardless of
    /// the active length.
    pub fn sounding_from(&self, from: usize) -> Vec<(usize, u8)> {
        self.last_note
            .iter()
            .enumerate()
            .skip(from)
            .filter_map(|(i, note)| note.map(|n| (i, n)))
            .collect()
    }

    pub fn mark_highlight(&mut self, lanes: &[usize], now: Instant) {
        for &lane in lanes {
            if lane < self.len {
                self.highlight_at[lane] = Some(now);
            }
        }
    }

    pub fn last_highlight(&self, lane: usize) -> Option<Instant> {
        self.highlight_at.get(lane).copied().flatten()
    }

    /// Highlight strength: 1.0 right after a mark, fading linearly to 0.0
    /// over `fade`.
    pub fn highlight_alpha(&self, lane: usize, now: Instant, fade: Duration) -> f32 {
        let Some(at) = self.last_highlight(lane) else {
            return 0.0;
        };
        if fade.is_zero() {
            return 0.0;
        }
        let elapsed = now.saturating_duration_since(at).as_secs_f32();
        (1.0 - elapsed / fade.as_secs_f32()).clamp(0.0, 1.0)
    }
}
