//! The logical topology: graph store, commit engine and proof API
//!
//! A [`Topology`] owns the raw map graph and every derived structure: the
//! leaf objects, their canonical encodings, the content-hash indices used
//! for reference resolution, and the Merkle tree the leaves commit into.
//! `commit` rebuilds all derived state from scratch; nothing survives from
//! a previous commit, so the result is a pure function of the graph and the
//! placed furniture.

use crate::error::{Error, Result};
use crate::furniture::{Furnishing, Furniture};
use crate::leaf::{
    leaf_hash, Choice, ChoiceType, Input, InputRow, LeafObject, LocationChoices, LocationExit,
    LocationFurnishing, LocationLink, LogicalRef, ObjectType, PreparedLeaf, RecoverTarget,
    RefKind, ResolveRef,
};
use crate::mapsource::{JoinSource, MapSource, RoomSource};
use crate::model::{Access, Digest, Join, Link, Location, Side};
use crate::trie::MerkleTree;
use std::collections::HashMap;
use tracing::debug;

/// Options for a single commit
#[derive(Clone, Copy, Debug, Default)]
pub struct CommitOptions {
    /// Emit one link leaf per join instead of one per direction
    pub unique_links: bool,
}

/// One kind of derived leaf: the objects, their canonical encodings, their
/// content hashes, and the hash index used for reference recovery
#[derive(Debug, Default)]
struct LeafSet {
    leaves: Vec<LeafObject>,
    prepared: Vec<PreparedLeaf>,
    hashes: Vec<Digest>,
    keys: HashMap<Digest, usize>,
}

impl LeafSet {
    fn push(&mut self, leaf: LeafObject, prepared: PreparedLeaf, hash: Digest) -> usize {
        let id = self.leaves.len();
        self.leaves.push(leaf);
        self.prepared.push(prepared);
        self.hashes.push(hash);
        self.keys.insert(hash, id);
        id
    }

    fn reset(&mut self) {
        self.leaves.clear();
        self.prepared.clear();
        self.hashes.clear();
        self.keys.clear();
    }

    fn len(&self) -> usize {
        self.leaves.len()
    }
}

/// A map committed as a Merkle tree, providing existence proofs for
/// locations and the logical connections between them.
#[derive(Debug, Default)]
pub struct Topology {
    joins: Vec<Join>,
    locations: Vec<Location>,

    furniture: Option<Furniture>,
    finish: Option<Access>,

    choices: LeafSet,
    exits: LeafSet,
    exit_links: LeafSet,
    furnishings: LeafSet,

    /// `(location, side, exit)` -> exit leaf id, covering the finish exit too
    location_exits: HashMap<Access, usize>,
    /// egress triple -> link leaf id
    link_ids: HashMap<Access, usize>,
    /// `(location, choice type, index)` -> furnishing leaf id
    furniture_ids: HashMap<(u16, ChoiceType, u16), usize>,

    finish_exit_id: Option<usize>,
    finish_location_id: Option<usize>,

    tree: Option<MerkleTree>,
    committed: bool,
}

impl Topology {
    pub fn new() -> Self {
        Topology::default()
    }

    /// Build a store from one parsed map document entry
    pub fn from_map_source(map: &MapSource) -> Result<Topology> {
        let mut topology = Topology::new();
        topology.extend_joins(&map.model.corridors)?;
        topology.extend_locations(&map.model.rooms)?;
        Ok(topology)
    }

    // --- graph store

    /// Append validated joins from document entries; rejects the whole
    /// batch if any entry is malformed
    pub fn extend_joins(&mut self, joins: &[JoinSource]) -> Result<()> {
        let joins = joins
            .iter()
            .map(JoinSource::to_join)
            .collect::<Result<Vec<_>>>()?;
        self.joins.extend(joins);
        Ok(())
    }

    /// Append validated locations from document entries; rejects the whole
    /// batch if any entry is malformed
    pub fn extend_locations(&mut self, rooms: &[RoomSource]) -> Result<()> {
        let locations = rooms
            .iter()
            .map(RoomSource::to_location)
            .collect::<Result<Vec<_>>>()?;
        self.locations.extend(locations);
        Ok(())
    }

    /// Append already-typed joins
    pub fn add_joins(&mut self, joins: impl IntoIterator<Item = Join>) {
        self.joins.extend(joins);
    }

    /// Append already-typed locations
    pub fn add_locations(&mut self, locations: impl IntoIterator<Item = Location>) {
        self.locations.extend(locations);
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    // --- furniture placement

    /// Place the finish exit. The placement needs a side and an exit index;
    /// whether it collides with a map exit is checked at commit time.
    pub fn place_finish(&mut self, finish: &Furnishing) -> Result<()> {
        if finish.kind != ObjectType::Finish {
            return Err(Error::MalformedFurniture(format!(
                "the finish must be a finish_exit item, not {}",
                finish.item.kind
            )));
        }
        let side = finish.item.data.placed_side()?.ok_or_else(|| {
            Error::MalformedFurniture("the finish placement has no side".into())
        })?;
        let exit = finish.item.data.exit.ok_or_else(|| {
            Error::MalformedFurniture("the finish placement has no exit index".into())
        })?;
        self.finish = Some(Access::new(finish.item.data.location, side, exit));
        Ok(())
    }

    /// Place the chest furniture; choosable items contribute menu entries
    /// and furnishing leaves on the next commit
    pub fn place_furniture(&mut self, furniture: Furniture) {
        self.furniture = Some(furniture);
    }

    // --- commit engine

    /// Commit with default options: both link directions per join
    pub fn commit(&mut self) -> Result<Digest> {
        self.commit_with(CommitOptions::default())
    }

    /// Derive every provable leaf from the graph, index it, and build the
    /// Merkle tree. All derived state from any earlier commit is discarded
    /// first; a structural error aborts the whole commit.
    pub fn commit_with(&mut self, options: CommitOptions) -> Result<Digest> {
        self.reset_commit();
        debug!(
            "committing topology: {} locations, {} joins",
            self.locations.len(),
            self.joins.len()
        );

        if let Some(finish) = self.finish {
            if finish.location as usize >= self.locations.len() {
                return Err(Error::Structural(format!(
                    "finish placed at unknown location {}",
                    finish.location
                )));
            }
        }

        for location_id in 0..self.locations.len() {
            self.commit_location(location_id)?;
        }

        let links = self
            .links(options.unique_links)
            .collect::<Result<Vec<_>>>()?;
        for link in links {
            let id_a = self.exit_id(link.a)?;
            let id_b = self.exit_id(link.b)?;
            let leaf = LeafObject::location_link(LocationLink::new(
                LogicalRef::proof(ObjectType::Exit, id_a),
                LogicalRef::proof(ObjectType::Exit, id_b),
            ));
            let prepared = leaf.prepare(self)?;
            let hash = leaf_hash(&prepared)?;
            let id = self.exit_links.push(leaf, prepared, hash);
            self.link_ids.insert(link.a, id);
        }

        let mut leaf_values = Vec::with_capacity(
            self.choices.len() + self.exits.len() + self.exit_links.len() + self.furnishings.len(),
        );
        leaf_values.extend_from_slice(&self.choices.hashes);
        leaf_values.extend_from_slice(&self.exits.hashes);
        leaf_values.extend_from_slice(&self.exit_links.hashes);
        leaf_values.extend_from_slice(&self.furnishings.hashes);

        let tree = MerkleTree::build(&leaf_values)?;
        let root = tree.root();
        debug!("committed {} leaves, root {}", leaf_values.len(), root.short());
        self.tree = Some(tree);
        self.committed = true;
        Ok(root)
    }

    /// Derive the choice menu, exit and furnishing leaves for one location
    fn commit_location(&mut self, location_id: usize) -> Result<()> {
        let mut side_exits = self.location_exit_choices(location_id);
        let (furniture_kinds, furniture_choices) =
            self.location_furniture_choices(location_id as u16);

        // the finish contributes one extra slot on its location's menu
        let mut finish_slot = None;
        if let Some(finish) = self.finish {
            if finish.location as usize == location_id {
                if side_exits
                    .iter()
                    .any(|&(side, exit)| side == finish.side && exit == finish.exit)
                {
                    return Err(Error::Structural(
                        "finish placement conflicts with map exit".into(),
                    ));
                }
                finish_slot = Some(side_exits.len());
                side_exits.push((finish.side, finish.exit));
            }
        }

        let mut choices: Vec<Choice> = side_exits
            .iter()
            .map(|&(side, exit)| Choice::exit(side, exit))
            .collect();
        choices.extend(furniture_choices.iter().copied());

        let menu = LocationChoices::new(location_id as u16, choices);
        let choice_start = menu.choice_start();
        let leaf = LeafObject::location_choices(menu);
        let prepared = leaf.prepare(self)?;
        let hash = leaf_hash(&prepared)?;
        if self.choices.keys.contains_key(&hash) {
            return Err(Error::Structural(
                "locations are expected to be naturally unique".into(),
            ));
        }
        self.choices.push(leaf, prepared, hash);

        for (j, &(side, exit)) in side_exits.iter().enumerate() {
            let choice_ref =
                LogicalRef::proof_input(ObjectType::LocationChoices, location_id, choice_start + j);
            let leaf = if finish_slot == Some(j) {
                LeafObject::finish_exit(LocationExit::new(choice_ref))
            } else {
                LeafObject::location_exit(LocationExit::new(choice_ref))
            };
            let prepared = leaf.prepare(self)?;
            let hash = leaf_hash(&prepared)?;
            let id = self.exits.push(leaf, prepared, hash);
            if finish_slot == Some(j) {
                self.finish_exit_id = Some(id);
                self.finish_location_id = Some(location_id);
            }
            self.location_exits
                .insert(Access::new(location_id as u16, side, exit), id);
        }

        for (j, (&kind, choice)) in furniture_kinds
            .iter()
            .zip(furniture_choices.iter())
            .enumerate()
        {
            let choice_ref = LogicalRef::proof_input(
                ObjectType::LocationChoices,
                location_id,
                choice_start + side_exits.len() + j,
            );
            let leaf = LeafObject::furnishing(kind, LocationFurnishing::new(kind, choice_ref));
            let prepared = leaf.prepare(self)?;
            let hash = leaf_hash(&prepared)?;
            let id = self.furnishings.push(leaf, prepared, hash);
            self.furniture_ids
                .insert((location_id as u16, choice.choice_type, choice.index), id);
        }

        Ok(())
    }

    fn reset_commit(&mut self) {
        self.choices.reset();
        self.exits.reset();
        self.exit_links.reset();
        self.furnishings.reset();
        self.location_exits.clear();
        self.link_ids.clear();
        self.furniture_ids.clear();
        self.finish_exit_id = None;
        self.finish_location_id = None;
        self.tree = None;
        self.committed = false;
    }

    /// The flattened `(side, exit)` list for one location, sides 0 through
    /// 3 and exit index ascending within each side. This is the canonical
    /// choice numbering and must never be derived any other way.
    fn location_exit_choices(&self, location_id: usize) -> Vec<(Side, u16)> {
        let location = &self.locations[location_id];
        let mut choices = Vec::with_capacity(location.exit_count());
        for side in Side::ALL {
            for exit in 0..location.sides[side.index()].len() {
                choices.push((side, exit as u16));
            }
        }
        choices
    }

    /// The choosable furniture at a location: the committed kinds and the
    /// menu entries they occupy, in document order
    fn location_furniture_choices(&self, location: u16) -> (Vec<ObjectType>, Vec<Choice>) {
        let mut kinds = Vec::new();
        let mut choices = Vec::new();
        if let Some(furniture) = &self.furniture {
            for furnishing in furniture.by_location(location) {
                let Some(choice_type) = furnishing.choice_type else {
                    continue;
                };
                choices.push(Choice::new(choice_type, kinds.len() as u16));
                kinds.push(furnishing.kind);
            }
        }
        (kinds, choices)
    }

    // --- proof API

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// The committed root digest
    pub fn root(&self) -> Result<Digest> {
        Ok(self.tree()?.root())
    }

    /// The committed tree
    pub fn tree(&self) -> Result<&MerkleTree> {
        self.tree.as_ref().ok_or(Error::NotCommitted)
    }

    /// The inclusion proof for one committed leaf
    pub fn proof(&self, object_type: ObjectType, id: usize) -> Result<Vec<Digest>> {
        let index = self.leaf_index(object_type, id)?;
        self.tree()?.proof(index)
    }

    /// The committed leaf object for a kind and id
    pub fn leaf(&self, object_type: ObjectType, id: usize) -> Result<&LeafObject> {
        self.try_leaf(object_type, id)
            .ok_or_else(|| Error::NotFound(format!("no {object_type:?} leaf with id {id}")))
    }

    /// The canonical `(type, payload)` record for a committed leaf
    pub fn prepared_leaf(&self, object_type: ObjectType, id: usize) -> Result<&PreparedLeaf> {
        self.leaf_set(object_type)
            .prepared
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("no {object_type:?} leaf with id {id}")))
    }

    /// Prepare any leaf object against this topology's committed state.
    /// Callers use this to encode claims that must match committed leaves
    /// byte for byte.
    pub fn prepare_leaf(&self, leaf: &LeafObject) -> Result<PreparedLeaf> {
        leaf.prepare(self)
    }

    /// Every committed leaf identity, in tree feed order
    pub fn leaf_ids(&self) -> impl Iterator<Item = (ObjectType, usize)> + '_ {
        [
            &self.choices,
            &self.exits,
            &self.exit_links,
            &self.furnishings,
        ]
        .into_iter()
        .flat_map(|set| {
            set.leaves
                .iter()
                .enumerate()
                .map(|(id, leaf)| (leaf.object_type, id))
        })
    }

    /// The exit leaf id for a `(location, side, exit)` triple
    pub fn exit_id(&self, access: Access) -> Result<usize> {
        self.location_exits.get(&access).copied().ok_or_else(|| {
            Error::NotFound(format!("location exit not found for {access}"))
        })
    }

    /// The link leaf id whose egress is the given triple
    pub fn link_id(&self, egress: Access) -> Result<usize> {
        self.link_ids.get(&egress).copied().ok_or_else(|| {
            Error::NotFound(format!("location link not found for {egress}"))
        })
    }

    /// The furnishing leaf id for a location's choice entry
    pub fn furniture_id(&self, location: u16, choice_type: ChoiceType, index: u16) -> Result<usize> {
        self.furniture_ids
            .get(&(location, choice_type, index))
            .copied()
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "location furniture not found for {location}:{}:{index}",
                    choice_type.code()
                ))
            })
    }

    /// The exit leaf id the finish committed under, if one was placed
    pub fn finish_exit_id(&self) -> Option<usize> {
        self.finish_exit_id
    }

    /// The choice menu id of the finish location, if one was placed
    pub fn finish_location_id(&self) -> Option<usize> {
        self.finish_location_id
    }

    /// Build a `ProofInput` reference by matching a chosen input row
    /// against a committed choice menu
    pub fn reference_proof_input(
        &self,
        target_type: ObjectType,
        id: usize,
        choice: &[Input],
    ) -> Result<LogicalRef> {
        let input = self.recover_input(target_type, id, choice)?;
        Ok(LogicalRef::proof_input(target_type, id, input))
    }

    fn leaf_set(&self, object_type: ObjectType) -> &LeafSet {
        match object_type {
            ObjectType::LocationChoices => &self.choices,
            ObjectType::Exit | ObjectType::Finish => &self.exits,
            ObjectType::Link => &self.exit_links,
            ObjectType::FatalChestTrap | ObjectType::ChestTreasure => &self.furnishings,
        }
    }

    fn try_leaf(&self, object_type: ObjectType, id: usize) -> Option<&LeafObject> {
        self.leaf_set(object_type).leaves.get(id)
    }

    /// Position of a leaf in the tree feed order: choice menus, exits,
    /// links, furnishings
    fn leaf_index(&self, object_type: ObjectType, id: usize) -> Result<usize> {
        if id >= self.leaf_set(object_type).len() {
            return Err(Error::NotFound(format!(
                "no {object_type:?} leaf with id {id}"
            )));
        }
        let offset = match object_type {
            ObjectType::LocationChoices => 0,
            ObjectType::Exit | ObjectType::Finish => self.choices.len(),
            ObjectType::Link => self.choices.len() + self.exits.len(),
            ObjectType::FatalChestTrap | ObjectType::ChestTreasure => {
                self.choices.len() + self.exits.len() + self.exit_links.len()
            }
        };
        Ok(offset + id)
    }

    // --- navigation over the raw graph

    /// The access triple for endpoint `which` of a join
    pub fn join_access(&self, join: usize, which: usize) -> Result<Access> {
        if which > 1 {
            return Err(Error::InvalidArgument(format!(
                "which must be 0 or 1, not {which}"
            )));
        }
        let joined = self.joins.get(join).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "join index {join} is out of range, topology has {} joins",
                self.joins.len()
            ))
        })?;
        let location = joined.locations[which];
        let side = joined.sides[which];
        let exit = self.find_exit(join as u16, location, side).ok_or_else(|| {
            Error::Structural(format!(
                "join {join} does not have a corresponding access entry on location {location}"
            ))
        })?;
        Ok(Access::new(location, side, exit))
    }

    /// The directed link for a join: endpoint 0 as egress, endpoint 1 as
    /// ingress
    pub fn join_link(&self, join: usize) -> Result<Link> {
        Ok(Link::new(
            self.join_access(join, 0)?,
            self.join_access(join, 1)?,
        ))
    }

    /// The join a triple names; bounds-checked
    pub fn access_join(&self, access: Access) -> Result<Join> {
        let join = self.egress_join_index(access)?;
        self.joins.get(join as usize).copied().ok_or_else(|| {
            Error::Structural(format!("join index {join} out of range for egress {access}"))
        })
    }

    /// Follow a corridor from an egress triple to the ingress triple on the
    /// other end
    pub fn linked_access(&self, egress: Access) -> Result<Access> {
        let join_index = self.egress_join_index(egress)?;
        let join = self.joins.get(join_index as usize).ok_or_else(|| {
            Error::Structural(format!(
                "join index {join_index} out of range for egress {egress}"
            ))
        })?;
        let which = if join.locations[0] == egress.location {
            1
        } else {
            0
        };
        let location = join.locations[which];
        let side = join.sides[which];
        let exit = self.find_exit(join_index, location, side).ok_or_else(|| {
            Error::Structural(format!(
                "invalid map, no exit index for join {join_index} at location {location} side {side}"
            ))
        })?;
        Ok(Access::new(location, side, exit))
    }

    /// The full link for an egress triple
    pub fn linked(&self, egress: Access) -> Result<Link> {
        Ok(Link::new(egress, self.linked_access(egress)?))
    }

    /// The canonical flattened choice index of a triple within its
    /// location's menu (before any furniture entries)
    pub fn exit_index(&self, access: Access) -> Result<usize> {
        let location = self.locations.get(access.location as usize).ok_or_else(|| {
            Error::NotFound(format!("location {} not found", access.location))
        })?;
        if location.side_exit(access.side, access.exit).is_none() {
            return Err(Error::NotFound(format!(
                "location exit not found for {access}"
            )));
        }
        let before: usize = location.sides[..access.side.index()]
            .iter()
            .map(Vec::len)
            .sum();
        Ok(before + access.exit as usize)
    }

    /// All directed links on the topology; both directions per join unless
    /// `unique` is set
    pub fn links(&self, unique: bool) -> impl Iterator<Item = Result<Link>> + '_ {
        (0..self.joins.len()).flat_map(move |join| match self.join_link(join) {
            Ok(link) if unique => vec![Ok(link)],
            Ok(link) => vec![Ok(link), Ok(link.reversed())],
            Err(err) => vec![Err(err)],
        })
    }

    fn egress_join_index(&self, egress: Access) -> Result<u16> {
        self.locations
            .get(egress.location as usize)
            .and_then(|location| location.side_exit(egress.side, egress.exit))
            .ok_or_else(|| Error::InvalidArgument(format!("invalid egress {egress}")))
    }

    fn find_exit(&self, join: u16, location: u16, side: Side) -> Option<u16> {
        self.locations
            .get(location as usize)?
            .sides[side.index()]
            .iter()
            .position(|&j| j == join)
            .map(|exit| exit as u16)
    }
}

impl ResolveRef for Topology {
    fn resolve_ref(&self, reference: &LogicalRef) -> Result<InputRow> {
        let target = self
            .try_leaf(reference.target_type, reference.id)
            .ok_or_else(|| {
                Error::Structural(format!(
                    "unknown reference target {:?} id {}",
                    reference.target_type, reference.id
                ))
            })?;
        let prepared = target.prepare(self)?;
        let hash = leaf_hash(&prepared)?;
        match reference.kind {
            RefKind::Proof => Ok(vec![Input::from(hash)]),
            RefKind::ProofInput => {
                let index = reference.input.ok_or_else(|| {
                    Error::Structural("proof-input reference carries no input index".into())
                })?;
                let rows = target.inputs(self)?;
                let row = rows.get(index).ok_or_else(|| {
                    Error::Structural(format!(
                        "input {index} out of range for {:?} id {}",
                        reference.target_type, reference.id
                    ))
                })?;
                let mut resolved = Vec::with_capacity(1 + row.len());
                resolved.push(Input::from(hash));
                resolved.extend(row.iter().copied());
                Ok(resolved)
            }
        }
    }
}

impl RecoverTarget for Topology {
    fn recover_target(&self, digest: &Digest) -> Result<(ObjectType, usize)> {
        for set in [
            &self.choices,
            &self.exits,
            &self.exit_links,
            &self.furnishings,
        ] {
            if let Some(&id) = set.keys.get(digest) {
                return Ok((set.leaves[id].object_type, id));
            }
        }
        Err(Error::NotFound(format!(
            "no committed leaf with hash {}",
            digest.short()
        )))
    }

    fn recover_input(&self, target_type: ObjectType, id: usize, row: &[Input]) -> Result<usize> {
        let target = self.leaf(target_type, id)?;
        let menu = target.as_choices().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "input recovery is only supported for choice menus, not {target_type:?}"
            ))
        })?;
        menu.match_input(row).ok_or_else(|| {
            Error::NotFound(format!("input not matched for target type {target_type:?}"))
        })
    }
}
