//! Map generator document parsing
//!
//! The map generator publishes a document keyed by map name. Each entry
//! carries a `model` with `rooms` and `corridors` arrays. Two shapes are in
//! circulation: the raw generator shape (`corridors` side lists with
//! `main`/`inter` flags on rooms, `join_sides` on corridors) and the
//! normalized shape (`sides` plus a `flags` object, `sides` on corridors).
//! Both are accepted here and validated into the typed model.

use crate::error::{Error, Result};
use crate::model::{Join, Location, LocationFlags, Side, SIDE_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A corridor entry from the generator document
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JoinSource {
    /// The connected location pair
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joins: Option<[u16; 2]>,

    /// Attachment sides, normalized shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sides: Option<[u8; 2]>,

    /// Attachment sides, raw generator shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_sides: Option<[u8; 2]>,
}

impl JoinSource {
    /// Validate into a typed [`Join`]
    pub fn to_join(&self) -> Result<Join> {
        let locations = self.joins.ok_or_else(|| {
            Error::MalformedMap("badly structured join object, it has no location pair".into())
        })?;
        let sides = self.sides.or(self.join_sides).ok_or_else(|| {
            Error::MalformedMap(
                "badly structured join object, has neither sides nor join_sides".into(),
            )
        })?;
        Ok(Join::new(
            locations,
            [Side::try_from(sides[0])?, Side::try_from(sides[1])?],
        ))
    }
}

impl From<Join> for JoinSource {
    fn from(join: Join) -> Self {
        JoinSource {
            joins: Some(join.locations),
            sides: Some([join.sides[0].into(), join.sides[1].into()]),
            join_sides: None,
        }
    }
}

/// A room entry from the generator document
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoomSource {
    /// Per-side join lists, normalized shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sides: Option<[Vec<u16>; SIDE_COUNT]>,

    /// Per-side join lists, raw generator shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corridors: Option<[Vec<u16>; SIDE_COUNT]>,

    /// Flags, normalized shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<LocationFlags>,

    /// Raw generator shape sets the flags inline
    #[serde(default)]
    pub main: bool,
    #[serde(default)]
    pub inter: bool,
}

impl RoomSource {
    /// Validate into a typed [`Location`]
    pub fn to_location(&self) -> Result<Location> {
        if let Some(corridors) = &self.corridors {
            return Ok(Location::new(
                corridors.clone(),
                LocationFlags {
                    main: self.main,
                    inter: self.inter,
                    california: false,
                },
            ));
        }
        let sides = self
            .sides
            .clone()
            .ok_or_else(|| Error::MalformedMap("badly structured location object".into()))?;
        Ok(Location::new(sides, self.flags.unwrap_or_default()))
    }
}

impl From<Location> for RoomSource {
    fn from(location: Location) -> Self {
        RoomSource {
            sides: Some(location.sides),
            corridors: None,
            flags: Some(location.flags),
            main: false,
            inter: false,
        }
    }
}

/// The geometry model inside one map entry
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapModel {
    pub rooms: Vec<RoomSource>,
    pub corridors: Vec<JoinSource>,
}

/// One named map entry from the generator document
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapSource {
    pub model: MapModel,
}

/// Parse the name-keyed map document.
///
/// The entries are returned in name order so that callers iterating the
/// collection behave the same on every run.
pub fn parse_map_collection(document: &str) -> Result<BTreeMap<String, MapSource>> {
    Ok(serde_json::from_str(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_normalized_shape() {
        let source: JoinSource =
            serde_json::from_str(r#"{"joins": [0, 1], "sides": [3, 1]}"#).unwrap();
        let join = source.to_join().unwrap();
        assert_eq!(join.locations, [0, 1]);
        assert_eq!(join.sides, [Side::East, Side::West]);
    }

    #[test]
    fn test_join_raw_shape() {
        let source: JoinSource =
            serde_json::from_str(r#"{"joins": [2, 3], "join_sides": [0, 2]}"#).unwrap();
        let join = source.to_join().unwrap();
        assert_eq!(join.sides, [Side::North, Side::South]);
    }

    #[test]
    fn test_join_missing_sides() {
        let source: JoinSource = serde_json::from_str(r#"{"joins": [0, 1]}"#).unwrap();
        let err = source.to_join().unwrap_err();
        assert!(err
            .to_string()
            .contains("has neither sides nor join_sides"));
    }

    #[test]
    fn test_join_missing_locations() {
        let source: JoinSource = serde_json::from_str(r#"{"sides": [0, 1]}"#).unwrap();
        assert!(matches!(source.to_join(), Err(Error::MalformedMap(_))));
    }

    #[test]
    fn test_join_bad_side_rejected() {
        let source: JoinSource =
            serde_json::from_str(r#"{"joins": [0, 1], "sides": [4, 1]}"#).unwrap();
        assert!(matches!(source.to_join(), Err(Error::InvalidSide(4))));
    }

    #[test]
    fn test_room_normalized_shape() {
        let source: RoomSource =
            serde_json::from_str(r#"{"sides": [[], [], [], [0]], "flags": {"main": true}}"#)
                .unwrap();
        let location = source.to_location().unwrap();
        assert_eq!(location.sides[3], vec![0]);
        assert!(location.flags.main);
    }

    #[test]
    fn test_room_raw_shape() {
        let source: RoomSource =
            serde_json::from_str(r#"{"corridors": [[0], [], [], []], "inter": true}"#).unwrap();
        let location = source.to_location().unwrap();
        assert_eq!(location.sides[0], vec![0]);
        assert!(location.flags.inter);
        assert!(!location.flags.main);
    }

    #[test]
    fn test_room_missing_sides() {
        let source: RoomSource = serde_json::from_str(r#"{"main": true}"#).unwrap();
        assert!(matches!(source.to_location(), Err(Error::MalformedMap(_))));
    }

    #[test]
    fn test_room_wrong_side_count_rejected() {
        // a location needs exactly four per-side lists
        let result: std::result::Result<RoomSource, _> =
            serde_json::from_str(r#"{"sides": [[], [], []]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_map_collection() {
        let document = r#"{
            "map02": {
                "model": {
                    "rooms": [
                        {"sides": [[], [], [], [0]], "flags": {}},
                        {"sides": [[], [0], [], []], "flags": {}}
                    ],
                    "corridors": [{"joins": [0, 1], "sides": [3, 1]}]
                }
            }
        }"#;
        let maps = parse_map_collection(document).unwrap();
        let map02 = &maps["map02"];
        assert_eq!(map02.model.rooms.len(), 2);
        assert_eq!(map02.model.corridors.len(), 1);
    }
}
