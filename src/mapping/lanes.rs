//! Lane target resolution: which lanes a single input point edits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConductorError;

/// Which way an edit group grows from its starting lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward higher lane indices.
    Forward,
    /// Toward lower lane indices.
    Backward,
}

impl Direction {
    pub fn step(&self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

impl FromStr for Direction {
    type Err = ConductorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "+1" | "up" => Ok(Direction::Forward),
            "backward" | "-1" | "down" => Ok(Direction::Backward),
            _ => Err(ConductorError::UnknownDirection(s.to_string())),
        }
    }
}

/// Edit-group parameters shared by all input sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditGroup {
    pub edit_count: usize,
    pub select_all: bool,
}

impl Default for EditGroup {
    fn default() -> Self {
        Self {
            edit_count: 1,
            select_all: false,
        }
    }
}

/// Lanes affected by an input point starting at `start_lane`.
///
/// With `select_all` every lane is returned. Otherwise `start_lane` is
/// clamped into range, `edit_count` into `[1, lanes]`, and the group walks
/// from the start in `direction`, dropping indices that fall off either end
/// (no wraparound). Output is ascending and free of duplicates; it is empty
/// only when `lanes == 0`.
pub fn resolve_targets(
    lanes: usize,
    edit_count: usize,
    select_all: bool,
    start_lane: usize,
    direction: Direction,
) -> Vec<usize> {
    if lanes == 0 {
        return Vec::new();
    }
    if select_all {
        return (0..lanes).collect();
    }

    let start = start_lane.min(lanes - 1) as i64;
    let count = edit_count.clamp(1, lanes) as i64;
    let step = direction.step();

    let mut out: Vec<usize> = (0..count)
        .map(|k| start + k * step)
        .filter(|&idx| idx >= 0 && idx < lanes as i64)
        .map(|idx| idx as usize)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

impl EditGroup {
    pub fn resolve(&self, lanes: usize, start_lane: usize, direction: Direction) -> Vec<usize> {
        resolve_targets(lanes, self.edit_count, self.select_all, start_lane, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    #[test]
    fn forward_group() {
        assert_eq!(resolve_targets(4, 2, false, 1, Forward), vec![1, 2]);
    }

    #[test]
    fn backward_group_is_sorted() {
        assert_eq!(resolve_targets(4, 2, false, 2, Backward), vec![1, 2]);
        assert_eq!(resolve_targets(4, 3, false, 3, Backward), vec![1, 2, 3]);
    }

    #[test]
    fn select_all_overrides_group() {
        assert_eq!(resolve_targets(4, 2, true, 2, Forward), vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_lane_always_zero() {
        assert_eq!(resolve_targets(1, 3, false, 0, Forward), vec![0]);
        assert_eq!(resolve_targets(1, 3, false, 5, Backward), vec![0]);
    }

    #[test]
    fn no_wraparound_at_edges() {
        assert_eq!(resolve_targets(4, 3, false, 3, Forward), vec![3]);
        assert_eq!(resolve_targets(4, 3, false, 0, Backward), vec![0]);
    }

    #[test]
    fn counts_and_starts_clamp() {
        assert_eq!(resolve_targets(3, 0, false, 1, Forward), vec![1]);
        assert_eq!(resolve_targets(3, 99, false, 0, Forward), vec![0, 1, 2]);
        assert_eq!(resolve_targets(3, 2, false, 42, Backward), vec![1, 2]);
    }

    #[test]
    fn zero_lanes_is_empty() {
        assert!(resolve_targets(0, 1, true, 0, Forward).is_empty());
    }

    #[test]
    fn parse_direction() {
        assert_eq!("Forward".parse::<Direction>().unwrap(), Forward);
        assert_eq!("backward".parse::<Direction>().unwrap(), Backward);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
