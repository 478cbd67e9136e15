//! Mapping from continuous input positions to lanes, pan, and pitch.

/// Hand-tracking feed: mirroring video points onto the stage.
pub mod hands;
/// Lane target resolution for edit groups.
pub mod lanes;
/// Stage geometry: lane strips, pan, and raw pitch.
pub mod stage;

pub use hands::{HandFrame, HandLabel, HandSample, Marker, VideoSpace};
pub use lanes::{resolve_targets, Direction, EditGroup};
pub use stage::{map_point, LanePoint, PitchRange, StageRect};
