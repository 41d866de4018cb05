//! Furniture placement documents
//!
//! The furniture collaborator publishes a document of placed items: the
//! finish exit and any chests. Items resolve to [`Furnishing`] values
//! holding the committed kind and, for chest kinds, the choice discriminant
//! their menu entry commits under. The finish is furniture too, but it is
//! handled as an exit and so carries no choice discriminant of its own.

use crate::error::{Error, Result};
use crate::leaf::{ChoiceType, ObjectType};
use crate::model::Side;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where an item sits: a location and, for placements that occupy a choice
/// slot on the menu, the side and exit index
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub location: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<u16>,
}

impl Placement {
    /// The placement side as a typed value, if one was given
    pub fn placed_side(&self) -> Result<Option<Side>> {
        self.side.map(Side::try_from).transpose()
    }
}

/// One item from the furniture document
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FurnitureItem {
    /// Required for singleton items such as the finish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// The furniture kind name, e.g. `finish_exit` or `fatal_chest_trap`
    #[serde(rename = "type")]
    pub kind: String,

    pub data: Placement,
}

impl FurnitureItem {
    pub fn new(kind: impl Into<String>, data: Placement) -> Self {
        FurnitureItem {
            unique_name: None,
            labels: Vec::new(),
            kind: kind.into(),
            data,
        }
    }

    pub fn named(mut self, unique_name: impl Into<String>) -> Self {
        self.unique_name = Some(unique_name.into());
        self
    }
}

/// The canonical name of the finish singleton
pub const FINISH_EXIT: &str = "finish_exit";

/// A furniture item resolved against the committed kind codes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Furnishing {
    /// Position in the collection's item list
    pub id: usize,

    /// The leaf kind this item commits under
    pub kind: ObjectType,

    /// The menu discriminant for choosable items; the finish has none
    /// because it is committed as an exit
    pub choice_type: Option<ChoiceType>,

    pub item: FurnitureItem,
}

impl Furnishing {
    pub fn new(id: usize, item: FurnitureItem) -> Result<Self> {
        let (kind, choice_type) = match item.kind.as_str() {
            FINISH_EXIT => (ObjectType::Finish, None),
            "fatal_chest_trap" => (ObjectType::FatalChestTrap, Some(ChoiceType::OpenChest)),
            "chest_treasure" => (ObjectType::ChestTreasure, Some(ChoiceType::OpenChest)),
            other => {
                return Err(Error::MalformedFurniture(format!(
                    "item type {other} not found"
                )))
            }
        };
        Ok(Furnishing {
            id,
            kind,
            choice_type,
            item,
        })
    }

    pub fn location(&self) -> u16 {
        self.item.data.location
    }

    pub fn unique_name(&self) -> Option<&str> {
        self.item.unique_name.as_deref()
    }
}

/// The raw furniture document shape
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FurnitureDoc {
    /// Name of the map the items were placed against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,

    pub items: Vec<FurnitureItem>,
}

/// A validated furniture collection with name and kind lookups.
///
/// Items keep their document order; the item id is the index in that order
/// and is what furnishing leaves are recorded against.
#[derive(Clone, Debug, Default)]
pub struct Furniture {
    items: Vec<Furnishing>,
    identified: HashMap<String, usize>,
}

impl Furniture {
    /// Parse and validate a furniture document
    pub fn from_json(document: &str) -> Result<Self> {
        let doc: FurnitureDoc = serde_json::from_str(document)?;
        Furniture::from_items(doc.items)
    }

    /// Validate a list of items into a collection
    pub fn from_items(items: Vec<FurnitureItem>) -> Result<Self> {
        let mut furniture = Furniture::default();
        for item in items {
            furniture.add(item)?;
        }
        Ok(furniture)
    }

    fn add(&mut self, item: FurnitureItem) -> Result<()> {
        let id = self.items.len();
        if let Some(name) = &item.unique_name {
            if self.identified.contains_key(name) {
                return Err(Error::MalformedFurniture(format!(
                    "id {name} previously defined"
                )));
            }
            self.identified.insert(name.clone(), id);
        }
        self.items.push(Furnishing::new(id, item)?);
        Ok(())
    }

    pub fn items(&self) -> &[Furnishing] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The uniquely named item, erroring on a miss
    pub fn by_name(&self, name: &str) -> Result<&Furnishing> {
        self.identified
            .get(name)
            .map(|id| &self.items[*id])
            .ok_or_else(|| Error::NotFound(format!("name {name} not found")))
    }

    /// All items of one committed kind, in document order
    pub fn by_kind(&self, kind: ObjectType) -> Vec<&Furnishing> {
        self.items.iter().filter(|item| item.kind == kind).collect()
    }

    /// All items placed at `location`, in document order
    pub fn by_location(&self, location: u16) -> Vec<&Furnishing> {
        self.items
            .iter()
            .filter(|item| item.location() == location)
            .collect()
    }
}
