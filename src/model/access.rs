//! Exit access triples and the side numbering they share

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of sides on every location
pub const SIDE_COUNT: usize = 4;

/// Cardinal side of a location, clockwise from the top of the map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Side {
    North = 0,
    West = 1,
    South = 2,
    East = 3,
}

impl Side {
    /// All sides in their canonical flattening order
    pub const ALL: [Side; SIDE_COUNT] = [Side::North, Side::West, Side::South, Side::East];

    /// Index into a location's per-side lists
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Side {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Side::North),
            1 => Ok(Side::West),
            2 => Ok(Side::South),
            3 => Ok(Side::East),
            _ => Err(Error::InvalidSide(value)),
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 {
        side as u8
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// An ingress or egress point: a location, a side, and the position of the
/// exit within that side's join list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Access {
    pub location: u16,
    pub side: Side,
    pub exit: u16,
}

impl Access {
    pub fn new(location: u16, side: Side, exit: u16) -> Self {
        Access {
            location,
            side,
            exit,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.location, self.side, self.exit)
    }
}

/// A pair of linked accesses: `a` is the egress, `b` the ingress reached on
/// the other side of the join
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub a: Access,
    pub b: Access,
}

impl Link {
    pub fn new(a: Access, b: Access) -> Self {
        Link { a, b }
    }

    /// The same corridor traversed in the opposite direction
    pub fn reversed(&self) -> Link {
        Link {
            a: self.b,
            b: self.a,
        }
    }
}
