/*
Spatial Mapping
===============

The stage is an axis-aligned rectangle split into `lanes` equal vertical
strips. A point on the stage yields three things:

  lane index   which strip the point falls in (clamped to the outer strips)
  pan          where the point sits inside that strip, left edge = 0,
               centre = 64, right edge = 127
  raw pitch    a continuous pitch from the vertical position; top of the
               stage is the highest pitch

     left                                            left + width
      ┌────────────┬────────────┬────────────┬────────────┐ top     → 108
      │   lane 0   │   lane 1   │   lane 2   │   lane 3   │
      │  0  64 127 │            │            │            │
      └────────────┴────────────┴────────────┴────────────┘ bottom  → 48

Pan:
    centre = lane_left + lane_width / 2
    n      = clamp((x - centre) / (lane_width / 2), -1, 1)
    pan    = clamp(round(64 + 64 n), 0, 127)

Pitch:
    t   = (y - top) / height
    raw = clamp(high - t * span, floor, high)

Points beyond the stage never fail: the lane clamps to the outer strip, pan
clamps to the strip edge, and pitch clamps to [floor, high].
*/

use serde::{Deserialize, Serialize};

/// Interactive input area in stage coordinates (pixels, terminal cells, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl StageRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Width of a single lane strip.
    pub fn lane_width(&self, lanes: usize) -> f64 {
        self.width / lanes.max(1) as f64
    }

    /// Left edge and centre of lane `index`.
    pub fn lane_span(&self, index: usize, lanes: usize) -> (f64, f64) {
        let lw = self.lane_width(lanes);
        let lane_left = self.left + index as f64 * lw;
        (lane_left, lane_left + lw / 2.0)
    }

    /// Whether the rect has a usable (non-degenerate) area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Vertical pitch mapping. Top of stage maps to `high`, bottom to
/// `high - span`; the result never leaves `[floor, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchRange {
    pub high: f64,
    pub span: f64,
    pub floor: f64,
}

impl Default for PitchRange {
    fn default() -> Self {
        Self {
            high: 108.0,
            span: 60.0,
            floor: 21.0,
        }
    }
}

impl PitchRange {
    /// Keep the range inside MIDI bounds with `floor <= high`.
    pub fn sanitized(self) -> Self {
        let high = self.high.clamp(0.0, 127.0);
        Self {
            high,
            span: self.span.max(0.0),
            floor: self.floor.clamp(0.0, high),
        }
    }

    /// Raw pitch for a normalized vertical position (0 = top, 1 = bottom).
    pub fn pitch_at(&self, t: f64) -> f64 {
        (self.high - t * self.span).clamp(self.floor, self.high)
    }
}

/// Result of mapping one point onto the stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanePoint {
    pub lane: usize,
    pub pan: u8,
    pub raw_pitch: f64,
}

/// Lane index and pan for a horizontal position.
pub fn pan_for_x(x: f64, rect: &StageRect, lanes: usize) -> (usize, u8) {
    let lanes = lanes.max(1);
    if rect.is_empty() {
        return (0, 64);
    }

    let li = (((x - rect.left) / rect.width) * lanes as f64).floor();
    let lane = li.clamp(0.0, (lanes - 1) as f64) as usize;

    let (_, centre) = rect.lane_span(lane, lanes);
    let half = rect.lane_width(lanes) / 2.0;
    let n = ((x - centre) / half).clamp(-1.0, 1.0);
    let pan = (64.0 + n * 64.0).round().clamp(0.0, 127.0) as u8;

    (lane, pan)
}

/// Raw (unquantized) pitch for a vertical position.
pub fn raw_pitch_for_y(y: f64, rect: &StageRect, range: &PitchRange) -> f64 {
    if rect.is_empty() {
        return range.high;
    }
    let t = (y - rect.top) / rect.height;
    range.pitch_at(t)
}

/// Map a stage point to its lane, pan, and raw pitch. Pure.
pub fn map_point(x: f64, y: f64, rect: &StageRect, lanes: usize, range: &PitchRange) -> LanePoint {
    let (lane, pan) = pan_for_x(x, rect, lanes);
    LanePoint {
        lane,
        pan,
        raw_pitch: raw_pitch_for_y(y, rect, range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stage() -> StageRect {
        StageRect::new(100.0, 50.0, 800.0, 400.0)
    }

    #[test]
    fn lane_index_from_strip() {
        let r = stage();
        assert_eq!(pan_for_x(150.0, &r, 4).0, 0);
        assert_eq!(pan_for_x(350.0, &r, 4).0, 1);
        assert_eq!(pan_for_x(899.0, &r, 4).0, 3);
    }

    #[test]
    fn pan_is_centred_in_strip() {
        let r = stage();
        // lane 1 spans 300..500, centre 400
        assert_eq!(pan_for_x(400.0, &r, 4), (1, 64));
        assert_eq!(pan_for_x(300.0, &r, 4), (1, 0));
        // just left of the lane 0/1 boundary
        assert_eq!(pan_for_x(299.999, &r, 4).1, 127);
    }

    #[test]
    fn edges_clamp() {
        let r = stage();
        assert_eq!(pan_for_x(-1000.0, &r, 4), (0, 0));
        assert_eq!(pan_for_x(5000.0, &r, 4), (3, 127));
    }

    #[test]
    fn pitch_top_is_high_bottom_is_low() {
        let r = stage();
        let range = PitchRange::default();
        assert_eq!(raw_pitch_for_y(50.0, &r, &range), 108.0);
        assert_eq!(raw_pitch_for_y(450.0, &r, &range), 48.0);
        assert_eq!(raw_pitch_for_y(250.0, &r, &range), 78.0);
    }

    #[test]
    fn pitch_clamps_outside_stage() {
        let r = stage();
        let range = PitchRange::default();
        assert_eq!(raw_pitch_for_y(-500.0, &r, &range), 108.0);
        assert_eq!(raw_pitch_for_y(5000.0, &r, &range), 21.0);
    }

    #[test]
    fn single_lane_covers_stage() {
        let r = stage();
        let p = map_point(500.0, 50.0, &r, 1, &PitchRange::default());
        assert_eq!(p.lane, 0);
        assert_eq!(p.pan, 64);
    }

    #[test]
    fn degenerate_rect_does_not_panic() {
        let r = StageRect::new(0.0, 0.0, 0.0, 0.0);
        let p = map_point(10.0, 10.0, &r, 3, &PitchRange::default());
        assert_eq!(p.lane, 0);
        assert_eq!(p.pan, 64);
    }

    proptest! {
        #[test]
        fn lane_and_pan_always_in_range(
            x in -10_000.0f64..10_000.0,
            y in -10_000.0f64..10_000.0,
            lanes in 1usize..=8,
        ) {
            let range = PitchRange::default();
            let p = map_point(x, y, &stage(), lanes, &range);
            prop_assert!(p.lane < lanes);
            prop_assert!(p.pan <= 127);
            prop_assert!(p.raw_pitch >= range.floor && p.raw_pitch <= range.high);
        }
    }
}
