//! Scale table and pitch quantization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConductorError;
use crate::music::notes::pitch_class;

/// How far (in semitones) the quantizer looks on either side of the rounded
/// input before giving up.
pub const SEARCH_RADIUS: i32 = 24;

/// Largest magnitude `quantize` works with; keeps candidate arithmetic in range.
pub const RAW_LIMIT: f64 = 1e6;

/// The fixed scale table exposed on the configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Chromatic,
    #[default]
    Major,
    Minor,
    Dorian,
    Lydian,
    Mixolydian,
}

impl Scale {
    pub const ALL: [Scale; 6] = [
        Scale::Chromatic,
        Scale::Major,
        Scale::Minor,
        Scale::Dorian,
        Scale::Lydian,
        Scale::Mixolydian,
    ];

    /// Pitch-class offsets relative to the root, ascending.
    pub fn offsets(&self) -> &'static [u8] {
        match self {
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Chromatic => "chromatic",
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Dorian => "dorian",
            Scale::Lydian => "lydian",
            Scale::Mixolydian => "mixolydian",
        }
    }

    /// Next entry in the table, wrapping around (used by the UI to cycle).
    pub fn next(&self) -> Scale {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Snap `raw` to this scale rooted at `root_pc`.
    pub fn quantize(&self, raw: f64, root_pc: u8) -> i32 {
        quantize(raw, root_pc, self.offsets())
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = ConductorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|scale| scale.name() == wanted)
            .ok_or_else(|| ConductorError::UnknownScale(s.to_string()))
    }
}

/// Whether `note` belongs to the scale described by `root_pc` + `offsets`.
#[inline]
pub fn in_scale(note: i32, root_pc: u8, offsets: &[u8]) -> bool {
    let rel = (pitch_class(note) as i32 - root_pc as i32).rem_euclid(12) as u8;
    offsets.contains(&rel)
}

/// Snap a fractional pitch to the nearest in-scale integer pitch.
///
/// Candidates are visited outward from `round(raw)` (offsets 0, -1, +1, -2,
/// +2, ...) up to [`SEARCH_RADIUS`]. The closest candidate to `raw` wins; when
/// two candidates are exactly equidistant the lower one wins. If nothing in
/// range matches, the rounded input comes back unchanged. Inputs beyond
/// [`RAW_LIMIT`] are clamped to it first.
///
/// `offsets` must not be empty.
pub fn quantize(raw: f64, root_pc: u8, offsets: &[u8]) -> i32 {
    debug_assert!(!offsets.is_empty(), "scale needs at least one offset");

    let raw = raw.clamp(-RAW_LIMIT, RAW_LIMIT);
    let rounded = raw.round() as i32;
    let root_pc = root_pc % 12;
    let mut best: Option<(f64, i32)> = None;

    for step in 0..=(2 * SEARCH_RADIUS) {
        // 0, -1, +1, -2, +2, ...
        let offset = if step % 2 == 0 { step / 2 } else { -(step + 1) / 2 };
        let candidate = rounded + offset;
        if !in_scale(candidate, root_pc, offsets) {
            continue;
        }

        let dist = (candidate as f64 - raw).abs();
        let better = match best {
            None => true,
            Some((best_dist, best_note)) => {
                dist < best_dist || (dist == best_dist && candidate < best_note)
            }
        };
        if better {
            best = Some((dist, candidate));
        }
    }

    best.map(|(_, note)| note).unwrap_or(rounded)
}
