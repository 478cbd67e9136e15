//! Lazily created audio buses, one per lane.
//!
//! The registry is built once per session and owned by the conductor. A bus
//! is created the first time its lane is touched and is never freed: when
//! the lane count shrinks, buses beyond it simply go quiet. Without an audio
//! context (no backend, or monitoring disabled) every lookup returns `None`
//! and pan/preview calls do nothing.

use tracing::debug;

use super::bus::{AudioContext, LaneBus};
use super::panner::normalize_pan;
use super::preview::PreviewTone;
use crate::music::midi_to_freq;
use crate::{MAX_BLOCK_SIZE, MAX_LANES};

#[derive(Debug)]
pub struct BusRegistry {
    ctx: Option<AudioContext>,
    buses: Vec<Option<LaneBus>>,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl Default for BusRegistry {
    fn default() -> Self {
        Self::disabled()
    }
}

impl BusRegistry {
    pub fn new(ctx: AudioContext) -> Self {
        Self {
            ctx: Some(ctx),
            buses: (0..MAX_LANES).map(|_| None).collect(),
            left: vec![0.0; MAX_BLOCK_SIZE],
            right: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Registry with no audio context.
    pub fn disabled() -> Self {
        Self {
            ctx: None,
            buses: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    pub fn context(&self) -> Option<&AudioContext> {
        self.ctx.as_ref()
    }

    pub fn current_time(&self) -> f64 {
        self.ctx.map_or(0.0, |c| c.current_time())
    }

    /// Bus for `lane`, created on first access.
    pub fn get_bus(&mut self, lane: usize) -> Option<&mut LaneBus> {
        let ctx = self.ctx.as_ref()?;
        let slot = self.buses.get_mut(lane)?;
        if slot.is_none() {
            debug!(lane, "creating lane bus");
        }
        Some(slot.get_or_insert_with(|| LaneBus::new(ctx)))
    }

    /// Bus for `lane` if it already exists.
    pub fn bus(&self, lane: usize) -> Option<&LaneBus> {
        self.buses.get(lane).and_then(Option::as_ref)
    }

    /// Number of buses created so far.
    pub fn created(&self) -> usize {
        self.buses.iter().filter(|b| b.is_some()).count()
    }

    /// Apply a MIDI pan value (0..127) at the current context time.
    pub fn set_pan(&mut self, lane: usize, pan: u8) {
        let time = self.current_time();
        if let Some(bus) = self.get_bus(lane) {
            bus.set_pan(normalize_pan(pan), time);
        }
    }

    /// Start a preview tone for `note` on `lane`, panned to `pan`.
    pub fn preview(&mut self, lane: usize, note: u8, pan: u8) {
        let time = self.current_time();
        if let Some(bus) = self.get_bus(lane) {
            bus.set_pan(normalize_pan(pan), time);
            bus.add_tone(PreviewTone::new(midi_to_freq(note), time));
        }
    }

    /// Mix every bus into interleaved stereo `out` and advance the clock.
    ///
    /// Without a context the buffer is zeroed and nothing advances.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let Some(ctx) = self.ctx else {
            return;
        };
        let sample_rate = ctx.sample_rate();

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE * 2) {
            let frames = chunk.len() / 2;
            let start = self.ctx.map_or(0.0, |c| c.current_time());
            let left = &mut self.left[..frames];
            let right = &mut self.right[..frames];
            left.fill(0.0);
            right.fill(0.0);

            for bus in self.buses.iter_mut().flatten() {
                bus.render(left, right, start, sample_rate);
            }
            for (i, frame) in chunk.chunks_exact_mut(2).enumerate() {
                frame[0] = left[i];
                frame[1] = right[i];
            }
            if let Some(ctx) = self.ctx.as_mut() {
                ctx.advance(frames);
            }
        }
    }
}
