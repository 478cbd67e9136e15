//! Session configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file (or no file
//! at all) gives a working two-lane session in C major.
//!
//! ```toml
//! lane_count = 4
//! root = 2
//! scale = "dorian"
//! edit_count = 2
//!
//! [throttle]
//! pointer_ms = 30
//!
//! [midi]
//! output_hints = ["IAC", "loopMIDI"]
//! ```
//!
//! Out-of-range numbers are clamped by [`ConductorConfig::sanitized`];
//! unknown scale or direction names are load errors.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConductorError, Result};
use crate::io::output::{DEFAULT_INPUT_HINTS, DEFAULT_OUTPUT_HINTS};
use crate::mapping::{Direction, EditGroup, PitchRange, VideoSpace};
use crate::music::Scale;
use crate::{MAX_LANES, MIDI_CHANNEL_BASE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorConfig {
    /// Active lanes, `1..=lane_cap`.
    pub lane_count: usize,
    /// Upper bound for `lane_count`, `1..=MAX_LANES`.
    pub lane_cap: usize,
    /// Root pitch class, 0 = C.
    pub root: u8,
    #[serde(deserialize_with = "scale_by_name")]
    pub scale: Scale,
    pub edit_count: usize,
    pub select_all: bool,
    /// MIDI channel (1-based) of lane 0.
    pub channel_base: u8,
    pub pitch: PitchRange,
    pub throttle: ThrottleConfig,
    pub hands: HandsConfig,
    pub midi: MidiConfig,
    pub monitor: MonitorConfig,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            lane_count: 2,
            lane_cap: MAX_LANES,
            root: 0,
            scale: Scale::Major,
            edit_count: 1,
            select_all: false,
            channel_base: MIDI_CHANNEL_BASE,
            pitch: PitchRange::default(),
            throttle: ThrottleConfig::default(),
            hands: HandsConfig::default(),
            midi: MidiConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub pointer_ms: u64,
    pub hands_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            pointer_ms: 30,
            hands_ms: 33,
        }
    }
}

impl ThrottleConfig {
    pub fn pointer(&self) -> Duration {
        Duration::from_millis(self.pointer_ms)
    }

    pub fn hands(&self) -> Duration {
        Duration::from_millis(self.hands_ms)
    }
}

/// Hand-tracking feed geometry and per-marker edit direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandsConfig {
    pub video_width: f64,
    pub video_height: f64,
    /// Direction for groups anchored by the left marker.
    #[serde(deserialize_with = "direction_by_name")]
    pub left_direction: Direction,
    /// Direction for groups anchored by the right marker.
    #[serde(deserialize_with = "direction_by_name")]
    pub right_direction: Direction,
}

impl Default for HandsConfig {
    fn default() -> Self {
        let video = VideoSpace::default();
        Self {
            video_width: video.width,
            video_height: video.height,
            left_direction: Direction::Forward,
            right_direction: Direction::Backward,
        }
    }
}

impl HandsConfig {
    pub fn video(&self) -> VideoSpace {
        VideoSpace {
            width: self.video_width,
            height: self.video_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Output port name fragments, tried in order (case-insensitive).
    pub output_hints: Vec<String>,
    /// Input port name fragments for pitch/pan feedback.
    pub input_hints: Vec<String>,
    /// Listen for feedback on an input port.
    pub feedback: bool,
    /// Send CC123 to lanes removed by a lane-count decrease.
    pub all_sound_off: bool,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            output_hints: DEFAULT_OUTPUT_HINTS.iter().map(|s| s.to_string()).collect(),
            input_hints: DEFAULT_INPUT_HINTS.iter().map(|s| s.to_string()).collect(),
            feedback: true,
            all_sound_off: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Create audio buses at all.
    pub enabled: bool,
    /// Use the single-node panner rather than the split-gain fallback.
    pub native_panner: bool,
    /// Audition pitch changes with a short sine tone.
    pub preview_tone: bool,
    pub highlight_fade_ms: u64,
    pub preview_gap_ms: u64,
    pub sample_rate: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            native_panner: true,
            preview_tone: false,
            highlight_fade_ms: 900,
            preview_gap_ms: 100,
            sample_rate: 48_000.0,
        }
    }
}

impl MonitorConfig {
    pub fn highlight_fade(&self) -> Duration {
        Duration::from_millis(self.highlight_fade_ms)
    }

    pub fn preview_gap(&self) -> Duration {
        Duration::from_millis(self.preview_gap_ms)
    }
}

impl ConductorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        Ok(config.sanitized())
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConductorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Clamp every numeric field into its valid range.
    pub fn sanitized(mut self) -> Self {
        self.lane_cap = self.lane_cap.clamp(1, MAX_LANES);
        self.lane_count = self.lane_count.clamp(1, self.lane_cap);
        self.root %= 12;
        self.edit_count = self.edit_count.clamp(1, self.lane_count);
        self.channel_base = self.channel_base.clamp(1, 16);
        self.pitch = self.pitch.sanitized();
        self.hands.video_width = self.hands.video_width.max(1.0);
        self.hands.video_height = self.hands.video_height.max(1.0);
        if !(self.monitor.sample_rate.is_finite() && self.monitor.sample_rate >= 8_000.0) {
            self.monitor.sample_rate = MonitorConfig::default().sample_rate;
        }
        self
    }

    pub fn edit_group(&self) -> EditGroup {
        EditGroup {
            edit_count: self.edit_count,
            select_all: self.select_all,
        }
    }
}

fn scale_by_name<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Scale, D::Error> {
    let name = String::deserialize(d)?;
    name.parse().map_err(serde::de::Error::custom)
}

fn direction_by_name<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Direction, D::Error> {
    let name = String::deserialize(d)?;
    name.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ConductorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ConductorConfig::default());
        assert_eq!(config.throttle.pointer(), Duration::from_millis(30));
        assert_eq!(config.throttle.hands(), Duration::from_millis(33));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ConductorConfig::from_toml_str(
            r#"
            lane_count = 4
            scale = "Dorian"

            [hands]
            left_direction = "backward"

            [monitor]
            preview_tone = true
            "#,
        )
        .unwrap();
        assert_eq!(config.lane_count, 4);
        assert_eq!(config.scale, Scale::Dorian);
        assert_eq!(config.hands.left_direction, Direction::Backward);
        assert_eq!(config.hands.right_direction, Direction::Backward);
        assert_eq!(config.hands.video_width, 640.0);
        assert!(config.monitor.preview_tone);
        assert_eq!(config.monitor.highlight_fade_ms, 900);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let config = ConductorConfig::from_toml_str(
            r#"
            lane_cap = 20
            lane_count = 12
            root = 14
            edit_count = 0
            channel_base = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.lane_cap, MAX_LANES);
        assert_eq!(config.lane_count, MAX_LANES);
        assert_eq!(config.root, 2);
        assert_eq!(config.edit_count, 1);
        assert_eq!(config.channel_base, 1);
    }

    #[test]
    fn lane_cap_bounds_lane_count() {
        let config = ConductorConfig::from_toml_str("lane_cap = 4\nlane_count = 8\nedit_count = 8").unwrap();
        assert_eq!(config.lane_count, 4);
        assert_eq!(config.edit_count, 4);
    }

    #[test]
    fn unknown_scale_is_an_error() {
        let err = ConductorConfig::from_toml_str("scale = \"phrygian\"").unwrap_err();
        assert!(matches!(err, ConductorError::ConfigParse(_)));
        assert!(err.to_string().contains("phrygian"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ConductorConfig::from_toml_file("/nonexistent/conductor.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/conductor.toml"));
    }
}
