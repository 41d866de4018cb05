//! Location (room) type and its per-side exit lists

use super::{Side, SIDE_COUNT};
use serde::{Deserialize, Serialize};

/// Flags a map generator may set on a room
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFlags {
    /// Absorbing location used to prove invalid moves lead nowhere
    #[serde(default)]
    pub california: bool,

    /// A normal room
    #[serde(default)]
    pub main: bool,

    /// A corridor intersection
    #[serde(default)]
    pub inter: bool,
}

/// A room in the map graph.
///
/// `sides` indexes the topology's join table for each side, clockwise from
/// the top: North, West, South, East. A join can be listed at most once in
/// any single side list, because a corridor cannot enter the same room twice
/// on one side. That is why the exit index is never stored explicitly; it is
/// always recoverable by searching the (short) side list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub sides: [Vec<u16>; SIDE_COUNT],
    pub flags: LocationFlags,
}

impl Location {
    pub fn new(sides: [Vec<u16>; SIDE_COUNT], flags: LocationFlags) -> Self {
        Location { sides, flags }
    }

    /// The join index at `(side, exit)`, if that exit exists
    pub fn side_exit(&self, side: Side, exit: u16) -> Option<u16> {
        self.sides[side.index()].get(exit as usize).copied()
    }

    /// Total number of exits across all four sides
    pub fn exit_count(&self) -> usize {
        self.sides.iter().map(|side| side.len()).sum()
    }
}
