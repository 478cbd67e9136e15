//! Stereo placement of a mono lane signal.

/*
Equal-Power Panning
===================

A lane's pan arrives as a MIDI value 0..127 and is normalized to
p ∈ [-1, +1] with `(value - 64) / 64` (64 = centre).

Linear panning (left = 1 - x, right = x) dips in perceived loudness at the
centre, because two half-amplitude channels carry only half the power of
one full channel. Equal-power panning keeps left² + right² = 1:

    θ     = (p + 1) × π/4          (0 → π/2)
    left  = cos θ
    right = sin θ

      p     left     right
    -1.0   1.000    0.000
     0.0   0.707    0.707
    +1.0   0.000    1.000

Two stages produce the same law:

  StereoPanner  a single node whose `pan` parameter is automated; the gains
                are derived per sample from the parameter value.
  SplitPanner   the fallback topology: the signal is split into two gain
                stages whose gains are computed once when pan is set.

Which one a bus gets depends on the context's `native_panner` flag.
*/

use std::f32::consts::FRAC_PI_4;

use super::param::AudioParam;

/// MIDI pan (0..127) to normalized pan (-1..+1).
#[inline]
pub fn normalize_pan(value: u8) -> f32 {
    ((value as f32 - 64.0) / 64.0).clamp(-1.0, 1.0)
}

/// Equal-power gains `(left, right)` for normalized pan `p`.
#[inline]
pub fn equal_power(p: f32) -> (f32, f32) {
    let theta = (p.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (theta.cos(), theta.sin())
}

/// Places a mono block into a stereo pair.
pub trait Panner: Send {
    /// Schedule normalized pan `p` at context time `time`.
    fn set_pan(&mut self, p: f32, time: f64);

    /// Mix `input` into `left`/`right`, starting at context time `start`.
    fn process(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32], start: f64, sample_rate: f32);

    /// Pan in effect at `time`.
    fn pan_at(&self, time: f64) -> f32;
}

/// Panner with an automatable `pan` parameter.
#[derive(Debug, Clone)]
pub struct StereoPanner {
    pan: AudioParam,
}

impl Default for StereoPanner {
    fn default() -> Self {
        Self {
            pan: AudioParam::new(0.0),
        }
    }
}

impl StereoPanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Panner for StereoPanner {
    fn set_pan(&mut self, p: f32, time: f64) {
        self.pan.set_value_at_time(p.clamp(-1.0, 1.0), time);
    }

    fn process(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32], start: f64, sample_rate: f32) {
        debug_assert_eq!(input.len(), left.len());
        debug_assert_eq!(input.len(), right.len());

        self.pan.prune(start);
        let dt = 1.0 / sample_rate as f64;
        for (i, ((&x, l), r)) in input.iter().zip(left.iter_mut()).zip(right.iter_mut()).enumerate() {
            let (gl, gr) = equal_power(self.pan.value_at(start + i as f64 * dt));
            *l += x * gl;
            *r += x * gr;
        }
    }

    fn pan_at(&self, time: f64) -> f32 {
        self.pan.value_at(time)
    }
}

/// Two independent gain stages, one per output channel.
#[derive(Debug, Clone)]
pub struct SplitPanner {
    left: AudioParam,
    right: AudioParam,
    scratch: Vec<f32>,
}

impl Default for SplitPanner {
    fn default() -> Self {
        let (l, r) = equal_power(0.0);
        Self {
            left: AudioParam::new(l),
            right: AudioParam::new(r),
            scratch: Vec::new(),
        }
    }
}

impl SplitPanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Panner for SplitPanner {
    fn set_pan(&mut self, p: f32, time: f64) {
        let (l, r) = equal_power(p);
        self.left.set_value_at_time(l, time);
        self.right.set_value_at_time(r, time);
    }

    fn process(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32], start: f64, sample_rate: f32) {
        self.left.prune(start);
        self.right.prune(start);

        self.scratch.resize(input.len(), 0.0);
        self.left.render(&mut self.scratch, start, sample_rate);
        for ((o, &x), &g) in left.iter_mut().zip(input).zip(&self.scratch) {
            *o += x * g;
        }
        self.right.render(&mut self.scratch, start, sample_rate);
        for ((o, &x), &g) in right.iter_mut().zip(input).zip(&self.scratch) {
            *o += x * g;
        }
    }

    fn pan_at(&self, time: f64) -> f32 {
        // Invert θ = atan2(r, l) back to p.
        let l = self.left.value_at(time);
        let r = self.right.value_at(time);
        r.atan2(l) / FRAC_PI_4 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 1_000.0;

    #[test]
    fn normalize_maps_midi_range() {
        assert_eq!(normalize_pan(64), 0.0);
        assert_eq!(normalize_pan(0), -1.0);
        assert!((normalize_pan(127) - 0.984).abs() < 1e-3);
    }

    #[test]
    fn equal_power_endpoints() {
        let (l, r) = equal_power(-1.0);
        assert!((l - 1.0).abs() < 1e-6 && r.abs() < 1e-6);
        let (l, r) = equal_power(1.0);
        assert!(l.abs() < 1e-6 && (r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn equal_power_keeps_power_constant() {
        for step in 0..=20 {
            let p = -1.0 + step as f32 * 0.1;
            let (l, r) = equal_power(p);
            assert!((l * l + r * r - 1.0).abs() < 1e-5);
        }
    }

    fn render(panner: &mut dyn Panner) -> (Vec<f32>, Vec<f32>) {
        let input = vec![1.0; 4];
        let mut left = vec![0.0; 4];
        let mut right = vec![0.0; 4];
        panner.process(&input, &mut left, &mut right, 0.0, SR);
        (left, right)
    }

    #[test]
    fn both_topologies_agree() {
        let mut native = StereoPanner::new();
        let mut split = SplitPanner::new();
        native.set_pan(0.5, 0.0);
        split.set_pan(0.5, 0.0);

        let (nl, nr) = render(&mut native);
        let (sl, sr) = render(&mut split);
        for i in 0..4 {
            assert!((nl[i] - sl[i]).abs() < 1e-6);
            assert!((nr[i] - sr[i]).abs() < 1e-6);
        }
        assert!((split.pan_at(0.0) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn pan_applies_at_scheduled_time() {
        let mut native = StereoPanner::new();
        native.set_pan(-1.0, 0.002);
        let (left, right) = render(&mut native);
        // centre for the first two samples, hard left after
        assert!((left[0] - right[0]).abs() < 1e-6);
        assert!((left[3] - 1.0).abs() < 1e-6);
        assert!(right[3].abs() < 1e-6);
    }
}
