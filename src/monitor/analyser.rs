//! Read-only analysis taps on a lane bus.
//!
//! Each bus feeds two taps: a time-domain tap for the scope and level meter,
//! and a frequency-domain tap for the spectrum. Both keep the most recent
//! `fft_size` samples in a ring and compute on demand when polled.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Frequency tap defaults.
pub const FREQ_FFT_SIZE: usize = 1024;
pub const FREQ_SMOOTHING: f32 = 0.8;
/// Time tap defaults.
pub const TIME_FFT_SIZE: usize = 2048;
pub const TIME_SMOOTHING: f32 = 0.85;

pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

pub struct Analyser {
    fft_size: usize,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
    /// Last `fft_size` input samples; `write` is the oldest slot.
    ring: Vec<f32>,
    write: usize,
    /// Blackman window coefficients
    window: Vec<f32>,
    /// Smoothed linear magnitudes, one per bin
    smoothed: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl std::fmt::Debug for Analyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyser")
            .field("fft_size", &self.fft_size)
            .field("smoothing", &self.smoothing)
            .finish_non_exhaustive()
    }
}

impl Analyser {
    /// Tap with `fft_size` samples (rounded up to a power of two, at least 32).
    pub fn new(fft_size: usize, smoothing: f32) -> Self {
        let fft_size = fft_size.clamp(32, 32_768).next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft_size,
            smoothing: smoothing.clamp(0.0, 1.0),
            min_db: MIN_DECIBELS,
            max_db: MAX_DECIBELS,
            ring: vec![0.0; fft_size],
            write: 0,
            window: blackman(fft_size),
            smoothed: vec![0.0; fft_size / 2],
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    pub fn frequency_tap() -> Self {
        Self::new(FREQ_FFT_SIZE, FREQ_SMOOTHING)
    }

    pub fn time_tap() -> Self {
        Self::new(TIME_FFT_SIZE, TIME_SMOOTHING)
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Feed a block of samples.
    pub fn push(&mut self, block: &[f32]) {
        let n = self.fft_size;
        // Only the tail matters when the block is longer than the ring.
        let block = &block[block.len().saturating_sub(n)..];
        for &s in block {
            self.ring[self.write] = s;
            self.write = (self.write + 1) % n;
        }
    }

    /// Oldest-to-newest copy of the last `out.len()` samples (up to `fft_size`).
    pub fn float_time_domain(&self, out: &mut [f32]) {
        let n = self.fft_size;
        let len = out.len().min(n);
        let start = (self.write + n - len) % n;
        for (i, o) in out.iter_mut().take(len).enumerate() {
            *o = self.ring[(start + i) % n];
        }
    }

    /// RMS of the time-domain window.
    pub fn rms(&self) -> f32 {
        let sum: f32 = self.ring.iter().map(|s| s * s).sum();
        (sum / self.fft_size as f32).sqrt()
    }

    /// Window, transform, and smooth the current ring into `self.smoothed`.
    fn analyse(&mut self) {
        let n = self.fft_size;
        for i in 0..n {
            let s = self.ring[(self.write + i) % n];
            self.scratch[i] = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let tau = self.smoothing;
        let scale = 1.0 / n as f32;
        for (bin, prev) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.scratch[bin].norm() * scale;
            let next = tau * *prev + (1.0 - tau) * magnitude;
            *prev = if next.is_finite() { next } else { 0.0 };
        }
    }

    /// Smoothed spectrum in dB, one value per bin.
    pub fn float_frequency(&mut self, out: &mut [f32]) {
        self.analyse();
        for (o, &m) in out.iter_mut().zip(&self.smoothed) {
            *o = linear_to_db(m);
        }
    }

    /// Smoothed spectrum mapped from `[min_db, max_db]` to `0..=255`.
    pub fn byte_frequency(&mut self, out: &mut [u8]) {
        self.analyse();
        let range = (self.max_db - self.min_db).max(f32::EPSILON);
        for (o, &m) in out.iter_mut().zip(&self.smoothed) {
            let db = linear_to_db(m);
            *o = (255.0 * (db - self.min_db) / range).clamp(0.0, 255.0) as u8;
        }
    }

    /// Spectrum reduced to `count` bars in `0.0..=1.0`, averaging adjacent bins.
    pub fn bars(&mut self, count: usize) -> Vec<f32> {
        if count == 0 {
            return Vec::new();
        }
        let mut bytes = vec![0u8; self.frequency_bin_count()];
        self.byte_frequency(&mut bytes);

        let per_bar = (bytes.len() / count).max(1);
        (0..count)
            .map(|i| {
                let start = (i * per_bar).min(bytes.len());
                let end = (start + per_bar).min(bytes.len());
                let slice = &bytes[start..end];
                if slice.is_empty() {
                    return 0.0;
                }
                let sum: u32 = slice.iter().map(|&b| b as u32).sum();
                sum as f32 / (slice.len() as f32 * 255.0)
            })
            .collect()
    }
}

fn linear_to_db(m: f32) -> f32 {
    if m > 0.0 {
        20.0 * m.log10()
    } else {
        f32::NEG_INFINITY
    }
}

/// Blackman window, alpha = 0.16.
fn blackman(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn sizes_round_to_power_of_two() {
        assert_eq!(Analyser::new(1000, 0.5).fft_size(), 1024);
        assert_eq!(Analyser::frequency_tap().frequency_bin_count(), 512);
        assert_eq!(Analyser::time_tap().smoothing(), 0.85);
    }

    #[test]
    fn silence_reads_as_zero() {
        let tap = Analyser::time_tap();
        let mut samples = [1.0f32; 16];
        tap.float_time_domain(&mut samples);
        assert!(samples.iter().all(|&s| s == 0.0));
        assert_eq!(tap.rms(), 0.0);
    }

    #[test]
    fn time_domain_is_oldest_first() {
        let mut tap = Analyser::new(32, 0.0);
        let ramp: Vec<f32> = (0..40).map(|i| i as f32).collect();
        tap.push(&ramp);
        let mut out = [0.0; 4];
        tap.float_time_domain(&mut out);
        assert_eq!(out, [36.0, 37.0, 38.0, 39.0]);
    }

    #[test]
    fn rms_of_full_scale_sine() {
        let mut tap = Analyser::new(1024, 0.0);
        tap.push(&sine(375.0, 48_000.0, 1024));
        assert!((tap.rms() - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn spectrum_peaks_at_tone() {
        let sample_rate = 1024.0;
        let mut tap = Analyser::new(1024, 0.0);
        tap.push(&sine(64.0, sample_rate, 1024));

        let mut db = vec![0.0; tap.frequency_bin_count()];
        tap.float_frequency(&mut db);
        let peak = db
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(64));
    }

    #[test]
    fn smoothing_holds_energy_after_silence() {
        let mut tap = Analyser::new(256, 0.8);
        tap.push(&sine(32.0, 256.0, 256));
        let mut first = vec![0u8; 128];
        tap.byte_frequency(&mut first);

        tap.push(&vec![0.0; 256]);
        let mut second = vec![0u8; 128];
        tap.byte_frequency(&mut second);
        assert!(second[32] > 0);
        assert!(second[32] <= first[32]);
    }

    #[test]
    fn bars_are_normalized() {
        let mut tap = Analyser::frequency_tap();
        tap.push(&sine(440.0, 48_000.0, 1024));
        let bars = tap.bars(16);
        assert_eq!(bars.len(), 16);
        assert!(bars.iter().all(|b| (0.0..=1.0).contains(b)));
        assert!(bars.iter().any(|&b| b > 0.0));
    }
}
