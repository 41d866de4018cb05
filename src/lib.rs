//! # maptrie
//!
//! Merkle commitments for dungeon map topologies.
//!
//! maptrie flattens a map graph — rooms joined by corridors — into a
//! deterministic sequence of type-tagged leaves and commits them to a
//! Merkle tree. A verifier holding only the root digest can then check a
//! short proof that a claimed fact about the map (a room's exit menu, a
//! specific exit, a corridor between two exits, a placed chest) matches
//! what was originally committed, without seeing the whole map.
//!
//! ## Core Concepts
//!
//! - **Topology**: the graph store, commit engine and proof API in one
//! - **Leaves**: canonically encoded `(type, payload)` facts about the map
//! - **LogicalRefs**: lazy references between leaves, resolved to content
//!   hashes at encode time
//! - **Proofs**: positional sibling paths checked against the root digest
//!
//! ## Example
//!
//! ```ignore
//! use maptrie::{parse_map_collection, Topology};
//!
//! let maps = parse_map_collection(&document)?;
//! let mut topology = Topology::from_map_source(&maps["map02"])?;
//! let root = topology.commit()?;
//! let proof = topology.proof(maptrie::ObjectType::Link, 0)?;
//! ```

pub mod furniture;
pub mod leaf;
pub mod mapsource;
pub mod model;
pub mod trie;

mod error;
mod topology;

pub use error::{Error, Result};
pub use furniture::{Furnishing, Furniture, FurnitureItem, Placement, FINISH_EXIT};
pub use leaf::{
    leaf_hash, Choice, ChoiceType, Input, InputRow, LeafBody, LeafObject, LocationChoices,
    LocationExit, LocationFurnishing, LocationLink, LogicalRef, ObjectType, PreparedLeaf,
    RecoverTarget, RefKind, ResolveRef,
};
pub use mapsource::{parse_map_collection, JoinSource, MapModel, MapSource, RoomSource};
pub use model::{Access, Digest, Join, Link, Location, LocationFlags, Side, SIDE_COUNT};
pub use topology::{CommitOptions, Topology};
pub use trie::MerkleTree;
