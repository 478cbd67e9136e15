//! Audio context clock and the per-lane bus graph.

use super::analyser::Analyser;
use super::panner::{Panner, SplitPanner, StereoPanner};
use super::param::AudioParam;
use super::preview::PreviewTone;
use crate::MAX_BLOCK_SIZE;

/// Render clock shared by every bus.
///
/// Context time advances only when audio is rendered, so scheduled values
/// line up with the samples that carry them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioContext {
    sample_rate: f32,
    frames: u64,
    native_panner: bool,
}

impl AudioContext {
    pub fn new(sample_rate: f32, native_panner: bool) -> Self {
        Self {
            sample_rate: sample_rate.max(1.0),
            frames: 0,
            native_panner,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Seconds rendered so far.
    pub fn current_time(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn native_panner(&self) -> bool {
        self.native_panner
    }

    pub(crate) fn advance(&mut self, frames: usize) {
        self.frames += frames as u64;
    }
}

/// One lane's graph: sources → gain → { time tap, frequency tap, panner }.
pub struct LaneBus {
    gain: AudioParam,
    panner: Box<dyn Panner>,
    time_tap: Analyser,
    freq_tap: Analyser,
    tones: Vec<PreviewTone>,
    mono: Vec<f32>,
    gains: Vec<f32>,
}

impl std::fmt::Debug for LaneBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaneBus")
            .field("tones", &self.tones.len())
            .finish_non_exhaustive()
    }
}

impl LaneBus {
    pub fn new(ctx: &AudioContext) -> Self {
        let panner: Box<dyn Panner> = if ctx.native_panner() {
            Box::new(StereoPanner::new())
        } else {
            Box::new(SplitPanner::new())
        };
        Self {
            gain: AudioParam::new(1.0),
            panner,
            time_tap: Analyser::time_tap(),
            freq_tap: Analyser::frequency_tap(),
            tones: Vec::new(),
            mono: vec![0.0; MAX_BLOCK_SIZE],
            gains: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn set_pan(&mut self, p: f32, time: f64) {
        self.panner.set_pan(p, time);
    }

    pub fn pan_at(&self, time: f64) -> f32 {
        self.panner.pan_at(time)
    }

    pub fn time_tap(&self) -> &Analyser {
        &self.time_tap
    }

    pub fn time_tap_mut(&mut self) -> &mut Analyser {
        &mut self.time_tap
    }

    pub fn freq_tap_mut(&mut self) -> &mut Analyser {
        &mut self.freq_tap
    }

    pub fn add_tone(&mut self, tone: PreviewTone) {
        self.tones.push(tone);
    }

    pub fn active_tones(&self) -> usize {
        self.tones.len()
    }

    /// Render one block (at most `MAX_BLOCK_SIZE` frames) and add it to
    /// `left`/`right`.
    pub(crate) fn render(&mut self, left: &mut [f32], right: &mut [f32], start: f64, sample_rate: f32) {
        let frames = left.len().min(right.len()).min(MAX_BLOCK_SIZE);
        let mono = &mut self.mono[..frames];
        mono.fill(0.0);

        for tone in &mut self.tones {
            tone.render_into(mono, start, sample_rate);
        }
        let end = start + frames as f64 / sample_rate as f64;
        self.tones.retain(|t| !t.is_finished(end));

        self.gain.prune(start);
        let gains = &mut self.gains[..frames];
        self.gain.render(gains, start, sample_rate);
        for (s, &g) in mono.iter_mut().zip(gains.iter()) {
            *s *= g;
        }

        self.time_tap.push(mono);
        self.freq_tap.push(mono);
        self.panner
            .process(mono, &mut left[..frames], &mut right[..frames], start, sample_rate);
    }
}
