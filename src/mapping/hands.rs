//! Hand-tracking boundary.
//!
//! The tracker reports up to two hand centres per video frame in its own
//! pixel space (640×480 by default), unmirrored. The stage is shown as a
//! mirror image, so x is flipped before rescaling, and a hand the tracker
//! calls `left` steers the right marker.

use serde::{Deserialize, Serialize};

use super::stage::StageRect;
use crate::error::Result;

/// Handedness label reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandLabel {
    Left,
    Right,
}

/// One of the two draggable stage markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Left,
    Right,
}

impl HandLabel {
    /// Marker driven by this hand once the image is mirrored.
    pub fn marker(&self) -> Marker {
        match self {
            HandLabel::Left => Marker::Right,
            HandLabel::Right => Marker::Left,
        }
    }
}

/// A single hand centre in video coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandSample {
    pub x: f64,
    pub y: f64,
    pub label: HandLabel,
}

/// All hands seen in one processed video frame (zero to two).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    #[serde(default)]
    pub hands: Vec<HandSample>,
}

impl HandFrame {
    /// Parse one JSON line, e.g. `{"hands":[{"x":320,"y":240,"label":"left"}]}`.
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Pixel dimensions of the tracker's video frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoSpace {
    pub width: f64,
    pub height: f64,
}

impl Default for VideoSpace {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

impl VideoSpace {
    /// Mirror and rescale a video point into stage coordinates.
    pub fn to_stage(&self, sample: &HandSample, rect: &StageRect) -> (f64, f64) {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        let x = rect.left + ((w - sample.x) / w) * rect.width;
        let y = rect.top + (sample.y / h) * rect.height;
        (x, y)
    }
}
