//! Soft sine blip played into a lane bus when its pitch changes.
//!
//! The gain envelope mirrors a struck-and-released key: a 10 ms exponential
//! swell to 0.09, an exponential fade to near-silence by 1.2 s, and a hard
//! stop at 1.3 s.

use std::f64::consts::TAU;

use super::param::AudioParam;

pub const PEAK_GAIN: f32 = 0.09;
pub const FLOOR_GAIN: f32 = 0.0001;
pub const TAIL_GAIN: f32 = 0.0002;
pub const ATTACK: f64 = 0.01;
pub const DECAY_END: f64 = 1.2;
pub const STOP: f64 = 1.3;

#[derive(Debug, Clone)]
pub struct PreviewTone {
    frequency: f64,
    phase: f64,
    start: f64,
    stop: f64,
    gain: AudioParam,
}

impl PreviewTone {
    /// Tone at `frequency` Hz beginning at context time `start`.
    pub fn new(frequency: f32, start: f64) -> Self {
        let mut gain = AudioParam::new(0.0);
        gain.set_value_at_time(FLOOR_GAIN, start);
        gain.exponential_ramp_to_value_at_time(PEAK_GAIN, start + ATTACK);
        gain.exponential_ramp_to_value_at_time(TAIL_GAIN, start + DECAY_END);

        Self {
            frequency: frequency.max(0.0) as f64,
            phase: 0.0,
            start,
            stop: start + STOP,
            gain,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency as f32
    }

    /// Add this tone into `out`, whose first sample sits at `start`.
    pub fn render_into(&mut self, out: &mut [f32], start: f64, sample_rate: f32) {
        let sr = sample_rate as f64;
        let dt = 1.0 / sr;
        let step = TAU * self.frequency / sr;

        for (i, o) in out.iter_mut().enumerate() {
            let t = start + i as f64 * dt;
            if t < self.start {
                continue;
            }
            if t >= self.stop {
                break;
            }
            *o += (self.phase.sin() as f32) * self.gain.value_at(t);
            self.phase = (self.phase + step) % TAU;
        }
    }

    /// True once context time `now` has passed the stop time.
    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 8_000.0;

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn silent_before_start() {
        let mut tone = PreviewTone::new(440.0, 1.0);
        let mut out = vec![0.0; 800];
        tone.render_into(&mut out, 0.0, SR);
        assert_eq!(peak(&out), 0.0);
    }

    #[test]
    fn reaches_peak_after_attack() {
        let mut tone = PreviewTone::new(440.0, 0.0);
        let mut out = vec![0.0; 400];
        tone.render_into(&mut out, 0.0, SR);
        let p = peak(&out);
        assert!(p > 0.08 && p <= PEAK_GAIN + 1e-4, "peak {p}");
    }

    #[test]
    fn decays_and_stops() {
        let mut tone = PreviewTone::new(440.0, 0.0);
        let mut out = vec![0.0; (SR * 1.5) as usize];
        tone.render_into(&mut out, 0.0, SR);

        let late = &out[(SR * 1.15) as usize..(SR * 1.2) as usize];
        assert!(peak(late) < 0.001);
        let after = &out[(SR * 1.3) as usize + 1..];
        assert_eq!(peak(after), 0.0);
        assert!(tone.is_finished(1.3));
        assert!(!tone.is_finished(1.0));
    }

    #[test]
    fn continues_across_blocks() {
        let mut whole = PreviewTone::new(220.0, 0.0);
        let mut split = PreviewTone::new(220.0, 0.0);
        let mut a = vec![0.0; 256];
        whole.render_into(&mut a, 0.0, SR);

        let mut b = vec![0.0; 256];
        split.render_into(&mut b[..128], 0.0, SR);
        split.render_into(&mut b[128..], 128.0 / SR as f64, SR);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-5);
        }
    }
}
