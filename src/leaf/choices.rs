//! A location's choice menu leaf

use super::{Input, InputRow};
use crate::error::{Error, Result};
use crate::model::Side;
use serde::{Deserialize, Serialize};

/// Discriminates the entries of a location's choice menu.
///
/// The first four discriminants mirror the sides, so a map exit is the
/// choice `(side, exit index)`. Later discriminants cover non-exit choices;
/// each `OpenChest` entry identifies a chest that can be opened at the
/// location. The consequences of opening are not inferable from the entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChoiceType {
    North = 0,
    West = 1,
    South = 2,
    East = 3,
    OpenChest = 4,
}

impl ChoiceType {
    pub fn code(self) -> u64 {
        self as u64
    }
}

impl From<Side> for ChoiceType {
    fn from(side: Side) -> Self {
        match side {
            Side::North => ChoiceType::North,
            Side::West => ChoiceType::West,
            Side::South => ChoiceType::South,
            Side::East => ChoiceType::East,
        }
    }
}

impl TryFrom<u8> for ChoiceType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ChoiceType::North),
            1 => Ok(ChoiceType::West),
            2 => Ok(ChoiceType::South),
            3 => Ok(ChoiceType::East),
            4 => Ok(ChoiceType::OpenChest),
            _ => Err(Error::InvalidChoiceType(value)),
        }
    }
}

impl From<ChoiceType> for u8 {
    fn from(choice_type: ChoiceType) -> u8 {
        choice_type as u8
    }
}

/// One selectable menu entry: a discriminant and an index.
///
/// For side entries the index is the exit position within the side; for
/// chest entries it is the position among the location's chests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub choice_type: ChoiceType,
    pub index: u16,
}

impl Choice {
    pub fn new(choice_type: ChoiceType, index: u16) -> Self {
        Choice { choice_type, index }
    }

    /// A map exit entry
    pub fn exit(side: Side, index: u16) -> Self {
        Choice::new(ChoiceType::from(side), index)
    }

    fn row(&self) -> InputRow {
        vec![Input::Scalar(self.choice_type.code()), Input::from(self.index)]
    }
}

/// The committed choice menu for one location.
///
/// The input matrix is the location id row followed by one row per choice,
/// in the canonical flattening order: sides 0 through 3, exit index
/// ascending within each side, then chest entries. The row position of a
/// choice is the index a chooser uses to select it, so it must be stable
/// and reproducible from the raw map data alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChoices {
    pub location: u16,
    pub choices: Vec<Choice>,
}

impl LocationChoices {
    pub fn new(location: u16, choices: Vec<Choice>) -> Self {
        LocationChoices { location, choices }
    }

    /// The input row where the choices start; row 0 is the location id
    pub fn choice_start(&self) -> usize {
        1
    }

    /// The full input matrix; choice menus embed no references
    pub fn inputs(&self) -> Vec<InputRow> {
        let mut rows = Vec::with_capacity(1 + self.choices.len());
        rows.push(vec![Input::from(self.location)]);
        rows.extend(self.choices.iter().map(Choice::row));
        rows
    }

    /// The input row index whose values match `choice`, searching only the
    /// choice rows. This is how a player-chosen `(side, exit)` pair is
    /// mapped to its committed choice index.
    pub fn match_input(&self, choice: &[Input]) -> Option<usize> {
        let rows = self.inputs();
        rows.iter()
            .enumerate()
            .skip(self.choice_start())
            .find(|(_, row)| row.as_slice() == choice)
            .map(|(i, _)| i)
    }

    pub(crate) fn hydrate(rows: &[InputRow]) -> Result<LocationChoices> {
        let location_row = rows
            .first()
            .ok_or_else(|| Error::Corruption("choice menu has no location row".into()))?;
        let location = match location_row.as_slice() {
            [Input::Scalar(location)] => *location as u16,
            _ => return Err(Error::Corruption("malformed location row".into())),
        };
        let choices = rows[1..]
            .iter()
            .map(|row| match row.as_slice() {
                [Input::Scalar(choice_type), Input::Scalar(index)] => Ok(Choice::new(
                    ChoiceType::try_from(*choice_type as u8)?,
                    *index as u16,
                )),
                _ => Err(Error::Corruption("malformed choice row".into())),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LocationChoices { location, choices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_type_tracks_sides() {
        for side in Side::ALL {
            assert_eq!(ChoiceType::from(side).code(), side.index() as u64);
        }
        assert_eq!(ChoiceType::OpenChest.code(), 4);
    }

    #[test]
    fn test_inputs_shape() {
        let menu = LocationChoices::new(
            2,
            vec![Choice::exit(Side::East, 0), Choice::new(ChoiceType::OpenChest, 0)],
        );
        let rows = menu.inputs();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![Input::Scalar(2)]);
        assert_eq!(rows[1], vec![Input::Scalar(3), Input::Scalar(0)]);
        assert_eq!(rows[2], vec![Input::Scalar(4), Input::Scalar(0)]);
    }

    #[test]
    fn test_match_input_finds_choice_row() {
        let menu = LocationChoices::new(
            0,
            vec![Choice::exit(Side::West, 0), Choice::exit(Side::East, 0)],
        );
        let chosen = vec![Input::from(Side::East), Input::Scalar(0)];
        assert_eq!(menu.match_input(&chosen), Some(2));
    }

    #[test]
    fn test_match_input_never_matches_location_row() {
        // a single-value choice can not match the location id row
        let menu = LocationChoices::new(3, vec![]);
        assert_eq!(menu.match_input(&[Input::Scalar(3)]), None);
    }

    #[test]
    fn test_hydrate_roundtrip() {
        let menu = LocationChoices::new(
            1,
            vec![Choice::exit(Side::North, 0), Choice::exit(Side::North, 1)],
        );
        let rows = menu.inputs();
        assert_eq!(LocationChoices::hydrate(&rows).unwrap(), menu);
    }

    #[test]
    fn test_hydrate_rejects_empty() {
        assert!(LocationChoices::hydrate(&[]).is_err());
    }

    #[test]
    fn test_out_of_range_discriminant_rejected() {
        // 4 (OpenChest) is a valid discriminant but not a side, so the
        // rejection must name the choice discriminant, not a side index
        assert!(matches!(
            ChoiceType::try_from(5),
            Err(Error::InvalidChoiceType(5))
        ));
        let rows = vec![
            vec![Input::Scalar(0)],
            vec![Input::Scalar(5), Input::Scalar(0)],
        ];
        assert!(matches!(
            LocationChoices::hydrate(&rows),
            Err(Error::InvalidChoiceType(5))
        ));
    }
}
