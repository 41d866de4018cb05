//! The universal leaf wire unit and its canonical encoding

use super::{LocationChoices, LocationExit, LocationFurnishing, LocationLink};
use super::{RecoverTarget, ResolveRef};
use crate::error::{Error, Result};
use crate::model::{Digest, Side};
use serde::{Deserialize, Serialize};

/// Discriminates every leaf kind that can be committed to a tree.
///
/// The code makes leaf encodings unambiguous across kinds, so any leaf
/// object can be put in any tree without fear of ambiguity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum ObjectType {
    /// A location's choice menu
    LocationChoices = 1,

    /// One exit identity, bound to its slot in a choice menu
    Exit = 2,

    /// A directional connection between two exits
    Link = 3,

    /// The placed finish exit
    Finish = 4,

    /// An openable chest that ends the run
    FatalChestTrap = 5,

    /// An openable chest holding a reward
    ChestTreasure = 6,
}

impl ObjectType {
    /// The wire code committed alongside the leaf payload
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for ObjectType {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self> {
        match code {
            1 => Ok(ObjectType::LocationChoices),
            2 => Ok(ObjectType::Exit),
            3 => Ok(ObjectType::Link),
            4 => Ok(ObjectType::Finish),
            5 => Ok(ObjectType::FatalChestTrap),
            6 => Ok(ObjectType::ChestTreasure),
            _ => Err(Error::UnknownObjectType(code)),
        }
    }
}

impl From<ObjectType> for u16 {
    fn from(object_type: ObjectType) -> u16 {
        object_type as u16
    }
}

/// A single value in a leaf's input matrix.
///
/// Scalars cover locations, sides, exit indices and choice discriminants;
/// digests carry resolved references to other leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    Scalar(u64),
    Digest(Digest),
}

/// One row of a leaf's input matrix
pub type InputRow = Vec<Input>;

impl From<u64> for Input {
    fn from(value: u64) -> Self {
        Input::Scalar(value)
    }
}

impl From<u16> for Input {
    fn from(value: u16) -> Self {
        Input::Scalar(value as u64)
    }
}

impl From<Side> for Input {
    fn from(side: Side) -> Self {
        Input::Scalar(u8::from(side) as u64)
    }
}

impl From<Digest> for Input {
    fn from(digest: Digest) -> Self {
        Input::Digest(digest)
    }
}

impl Input {
    /// The scalar value, if this input is one
    pub fn scalar(&self) -> Option<u64> {
        match self {
            Input::Scalar(value) => Some(*value),
            Input::Digest(_) => None,
        }
    }

    /// The digest value, if this input is one
    pub fn digest(&self) -> Option<Digest> {
        match self {
            Input::Scalar(_) => None,
            Input::Digest(digest) => Some(*digest),
        }
    }
}

/// The logical content of each committable leaf kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafBody {
    Choices(LocationChoices),
    Exit(LocationExit),
    Link(LocationLink),
    Furnishing(LocationFurnishing),
}

/// A leaf body paired with the type code it commits under.
///
/// The pairing is explicit rather than derived because two codes can share a
/// body shape: the finish exit is an ordinary exit committed under
/// `Finish`, and both chest kinds commit a furnishing body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafObject {
    pub object_type: ObjectType,
    pub body: LeafBody,
}

impl LeafObject {
    /// A location's choice menu leaf
    pub fn location_choices(choices: LocationChoices) -> Self {
        LeafObject {
            object_type: ObjectType::LocationChoices,
            body: LeafBody::Choices(choices),
        }
    }

    /// An ordinary map exit leaf
    pub fn location_exit(exit: LocationExit) -> Self {
        LeafObject {
            object_type: ObjectType::Exit,
            body: LeafBody::Exit(exit),
        }
    }

    /// The finish exit leaf; same body as an exit, distinct code
    pub fn finish_exit(exit: LocationExit) -> Self {
        LeafObject {
            object_type: ObjectType::Finish,
            body: LeafBody::Exit(exit),
        }
    }

    /// A link leaf connecting two exits
    pub fn location_link(link: LocationLink) -> Self {
        LeafObject {
            object_type: ObjectType::Link,
            body: LeafBody::Link(link),
        }
    }

    /// A furnishing leaf committed under its kind's code
    pub fn furnishing(kind: ObjectType, furnishing: LocationFurnishing) -> Self {
        LeafObject {
            object_type: kind,
            body: LeafBody::Furnishing(furnishing),
        }
    }

    pub fn as_choices(&self) -> Option<&LocationChoices> {
        match &self.body {
            LeafBody::Choices(choices) => Some(choices),
            _ => None,
        }
    }

    pub fn as_exit(&self) -> Option<&LocationExit> {
        match &self.body {
            LeafBody::Exit(exit) => Some(exit),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&LocationLink> {
        match &self.body {
            LeafBody::Link(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_furnishing(&self) -> Option<&LocationFurnishing> {
        match &self.body {
            LeafBody::Furnishing(furnishing) => Some(furnishing),
            _ => None,
        }
    }

    /// The fully resolved input matrix for this leaf.
    ///
    /// Any embedded reference is resolved through `resolver`, so the result
    /// never contains symbolic values.
    pub fn inputs<R: ResolveRef + ?Sized>(&self, resolver: &R) -> Result<Vec<InputRow>> {
        match &self.body {
            LeafBody::Choices(choices) => Ok(choices.inputs()),
            LeafBody::Exit(exit) => exit.inputs(resolver),
            LeafBody::Link(link) => link.inputs(resolver),
            LeafBody::Furnishing(furnishing) => furnishing.inputs(resolver),
        }
    }

    /// Prepare the leaf for committing: resolve its references and encode
    /// the input matrix to canonical bytes.
    pub fn prepare<R: ResolveRef + ?Sized>(&self, resolver: &R) -> Result<PreparedLeaf> {
        let rows = self.inputs(resolver)?;
        Ok(PreparedLeaf {
            type_code: self.object_type.code(),
            payload: bincode::serialize(&rows)?,
        })
    }

    /// Rebuild a leaf object from its prepared form.
    ///
    /// Embedded digests are mapped back to references through `recovery`.
    /// This is the diagnostic inverse of `prepare`; the commit path never
    /// needs it.
    pub fn hydrate<R: RecoverTarget + ?Sized>(
        prepared: &PreparedLeaf,
        recovery: &R,
    ) -> Result<LeafObject> {
        let object_type = ObjectType::try_from(prepared.type_code)?;
        let rows: Vec<InputRow> = bincode::deserialize(&prepared.payload)?;
        let body = match object_type {
            ObjectType::LocationChoices => LeafBody::Choices(LocationChoices::hydrate(&rows)?),
            ObjectType::Exit | ObjectType::Finish => {
                LeafBody::Exit(LocationExit::hydrate(&rows, recovery)?)
            }
            ObjectType::Link => LeafBody::Link(LocationLink::hydrate(&rows, recovery)?),
            ObjectType::FatalChestTrap | ObjectType::ChestTreasure => {
                LeafBody::Furnishing(LocationFurnishing::hydrate(&rows, recovery)?)
            }
        };
        Ok(LeafObject { object_type, body })
    }
}

/// The wire form of a leaf: a type code and the canonically encoded input
/// matrix. Equal logical content always yields identical bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedLeaf {
    pub type_code: u16,
    pub payload: Vec<u8>,
}

impl PreparedLeaf {
    /// Decode the payload back into an input matrix
    pub fn rows(&self) -> Result<Vec<InputRow>> {
        Ok(bincode::deserialize(&self.payload)?)
    }
}

/// The tree node value for a prepared leaf.
///
/// The encoded `(type, payload)` record is hashed twice so a leaf value can
/// never collide with an interior node, which hashes a 64-byte child pair.
pub fn leaf_hash(prepared: &PreparedLeaf) -> Result<Digest> {
    let encoded = bincode::serialize(prepared)?;
    Ok(Digest::digest(Digest::digest(&encoded).as_bytes()))
}
