//! Join (corridor) type connecting two locations

use super::Side;
use serde::{Deserialize, Serialize};

/// A corridor connecting a pair of locations.
///
/// `locations` indexes the topology's location table; `sides[i]` is the side
/// of `locations[i]` the corridor attaches to. A join is immutable once
/// added and traversable in both directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    /// The pair of connected location indices
    pub locations: [u16; 2],

    /// The attachment side at each location, parallel to `locations`
    pub sides: [Side; 2],
}

impl Join {
    pub fn new(locations: [u16; 2], sides: [Side; 2]) -> Self {
        Join { locations, sides }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_endpoints_stay_parallel() {
        let join = Join::new([0, 1], [Side::East, Side::West]);
        assert_eq!(join.locations[0], 0);
        assert_eq!(join.sides[0], Side::East);
        assert_eq!(join.locations[1], 1);
        assert_eq!(join.sides[1], Side::West);
    }
}
