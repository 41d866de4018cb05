//! End-to-end commitment flow: parse a map document, commit it, and check
//! proofs the way the verifier side would.

use maptrie::{
    leaf_hash, parse_map_collection, Access, ChoiceType, Furniture, Input, LeafObject,
    MerkleTree, ObjectType, Side, Topology,
};

const MAP_DOCUMENT: &str = r#"{
    "map02": {
        "model": {
            "rooms": [
                {"sides": [[], [], [], [0]], "flags": {"main": true}},
                {"sides": [[], [0], [], []], "flags": {"main": true}}
            ],
            "corridors": [{"joins": [0, 1], "sides": [3, 1]}]
        }
    }
}"#;

const FURNITURE_DOCUMENT: &str = r#"{
    "map": "map02",
    "items": [
        {
            "unique_name": "finish_exit",
            "labels": ["victory_condition"],
            "type": "finish_exit",
            "data": {"location": 1, "side": 0, "exit": 0}
        },
        {
            "unique_name": "chest_1",
            "labels": ["death_trap"],
            "type": "fatal_chest_trap",
            "data": {"location": 0}
        }
    ]
}"#;

fn committed_map() -> Topology {
    let maps = parse_map_collection(MAP_DOCUMENT).unwrap();
    let mut topology = Topology::from_map_source(&maps["map02"]).unwrap();
    topology.commit().unwrap();
    topology
}

#[test]
fn commit_standard_two_room_map() {
    let topology = committed_map();
    // 2 choice menus, 2 exits, 2 directed links
    assert_eq!(topology.tree().unwrap().leaf_count(), 6);
}

#[test]
fn every_committed_leaf_verifies_against_the_root() {
    let topology = committed_map();
    let root = topology.root().unwrap();
    for (object_type, id) in topology.leaf_ids().collect::<Vec<_>>() {
        let prepared = topology.prepared_leaf(object_type, id).unwrap();
        let proof = topology.proof(object_type, id).unwrap();
        assert!(
            MerkleTree::verify(leaf_hash(prepared).unwrap(), &proof, root),
            "{object_type:?} leaf {id} did not verify"
        );
    }
}

#[test]
fn tampered_payload_fails_verification() {
    let topology = committed_map();
    let root = topology.root().unwrap();
    for (object_type, id) in topology.leaf_ids().collect::<Vec<_>>() {
        let prepared = topology.prepared_leaf(object_type, id).unwrap();
        let proof = topology.proof(object_type, id).unwrap();
        for byte in 0..prepared.payload.len() {
            let mut tampered = prepared.clone();
            tampered.payload[byte] ^= 0x01;
            assert!(
                !MerkleTree::verify(leaf_hash(&tampered).unwrap(), &proof, root),
                "tampering byte {byte} of {object_type:?} leaf {id} went undetected"
            );
        }
    }
}

#[test]
fn substituted_sibling_fails_verification() {
    let topology = committed_map();
    let root = topology.root().unwrap();
    let bogus = leaf_hash(topology.prepared_leaf(ObjectType::Exit, 0).unwrap()).unwrap();
    for (object_type, id) in topology.leaf_ids().collect::<Vec<_>>() {
        let prepared = topology.prepared_leaf(object_type, id).unwrap();
        let leaf = leaf_hash(prepared).unwrap();
        let proof = topology.proof(object_type, id).unwrap();
        for sibling in 0..proof.len() {
            let mut forged = proof.clone();
            if forged[sibling] == bogus {
                continue;
            }
            forged[sibling] = bogus;
            assert!(!MerkleTree::verify(leaf, &forged, root));
        }
    }
}

#[test]
fn rebuilt_topology_verifies_old_proofs() {
    let first = committed_map();
    let second = committed_map();
    assert_eq!(first.root().unwrap(), second.root().unwrap());

    // a proof from the first commit checks out against the second's root
    let proof = first.proof(ObjectType::LocationChoices, 0).unwrap();
    let leaf = leaf_hash(
        first
            .prepared_leaf(ObjectType::LocationChoices, 0)
            .unwrap(),
    )
    .unwrap();
    assert!(MerkleTree::verify(leaf, &proof, second.root().unwrap()));
}

#[test]
fn claimed_transition_checks_out() {
    // the host claims: choosing East exit 0 in room 0 leads to room 1's
    // West exit 0, and both facts are under the committed root
    let topology = committed_map();
    let root = topology.root().unwrap();

    let egress = Access::new(0, Side::East, 0);
    let ingress = topology.linked_access(egress).unwrap();
    assert_eq!(ingress, Access::new(1, Side::West, 0));

    let link_id = topology.link_id(egress).unwrap();
    let link_proof = topology.proof(ObjectType::Link, link_id).unwrap();
    let link_prepared = topology.prepared_leaf(ObjectType::Link, link_id).unwrap();
    assert!(MerkleTree::verify(
        leaf_hash(link_prepared).unwrap(),
        &link_proof,
        root
    ));

    // the link's two reference digests are exactly the committed exits
    let exit_a = topology.exit_id(egress).unwrap();
    let exit_b = topology.exit_id(ingress).unwrap();
    let rows = link_prepared.rows().unwrap();
    assert_eq!(
        rows[0][0],
        Input::from(leaf_hash(topology.prepared_leaf(ObjectType::Exit, exit_a).unwrap()).unwrap())
    );
    assert_eq!(
        rows[1][0],
        Input::from(leaf_hash(topology.prepared_leaf(ObjectType::Exit, exit_b).unwrap()).unwrap())
    );
}

#[test]
fn player_choice_maps_to_committed_input() {
    let topology = committed_map();
    let chosen = vec![Input::from(Side::East), Input::Scalar(0)];
    let reference = topology
        .reference_proof_input(ObjectType::LocationChoices, 0, &chosen)
        .unwrap();
    // row 0 is the location id, the single East exit is row 1
    assert_eq!(reference.input, Some(1));
}

#[test]
fn furnished_map_commits_finish_and_chest() {
    let maps = parse_map_collection(MAP_DOCUMENT).unwrap();
    let mut topology = Topology::from_map_source(&maps["map02"]).unwrap();

    let furniture = Furniture::from_json(FURNITURE_DOCUMENT).unwrap();
    topology
        .place_finish(furniture.by_name("finish_exit").unwrap())
        .unwrap();
    topology.place_furniture(furniture);
    let root = topology.commit().unwrap();

    // 2 menus, 3 exits (finish included), 2 links, 1 furnishing
    assert_eq!(topology.tree().unwrap().leaf_count(), 8);

    let finish_id = topology.finish_exit_id().unwrap();
    assert_eq!(
        topology.exit_id(Access::new(1, Side::North, 0)).unwrap(),
        finish_id
    );
    let finish_proof = topology.proof(ObjectType::Finish, finish_id).unwrap();
    let finish_leaf =
        leaf_hash(topology.prepared_leaf(ObjectType::Finish, finish_id).unwrap()).unwrap();
    assert!(MerkleTree::verify(finish_leaf, &finish_proof, root));

    let chest_id = topology.furniture_id(0, ChoiceType::OpenChest, 0).unwrap();
    let chest_proof = topology
        .proof(ObjectType::FatalChestTrap, chest_id)
        .unwrap();
    let chest_leaf = leaf_hash(
        topology
            .prepared_leaf(ObjectType::FatalChestTrap, chest_id)
            .unwrap(),
    )
    .unwrap();
    assert!(MerkleTree::verify(chest_leaf, &chest_proof, root));
}

#[test]
fn furnished_root_differs_from_bare_root() {
    let bare = committed_map();

    let maps = parse_map_collection(MAP_DOCUMENT).unwrap();
    let mut furnished = Topology::from_map_source(&maps["map02"]).unwrap();
    let furniture = Furniture::from_json(FURNITURE_DOCUMENT).unwrap();
    furnished
        .place_finish(furniture.by_name("finish_exit").unwrap())
        .unwrap();
    furnished.place_furniture(furniture);
    furnished.commit().unwrap();

    assert_ne!(bare.root().unwrap(), furnished.root().unwrap());
}

#[test]
fn hydrate_recovers_every_leaf() {
    let maps = parse_map_collection(MAP_DOCUMENT).unwrap();
    let mut topology = Topology::from_map_source(&maps["map02"]).unwrap();
    let furniture = Furniture::from_json(FURNITURE_DOCUMENT).unwrap();
    topology
        .place_finish(furniture.by_name("finish_exit").unwrap())
        .unwrap();
    topology.place_furniture(furniture);
    topology.commit().unwrap();

    for (object_type, id) in topology.leaf_ids().collect::<Vec<_>>() {
        let prepared = topology.prepared_leaf(object_type, id).unwrap();
        let hydrated = LeafObject::hydrate(prepared, &topology).unwrap();
        assert_eq!(&hydrated, topology.leaf(object_type, id).unwrap());

        // hydrated leaves re-prepare to the identical bytes
        let reprepared = topology.prepare_leaf(&hydrated).unwrap();
        assert_eq!(&reprepared, prepared);
    }
}

#[test]
fn malformed_documents_are_rejected() {
    let missing_sides = r#"{
        "bad": {
            "model": {
                "rooms": [{"flags": {}}],
                "corridors": []
            }
        }
    }"#;
    let maps = parse_map_collection(missing_sides).unwrap();
    assert!(Topology::from_map_source(&maps["bad"]).is_err());

    let missing_join_sides = r#"{
        "bad": {
            "model": {
                "rooms": [],
                "corridors": [{"joins": [0, 1]}]
            }
        }
    }"#;
    let maps = parse_map_collection(missing_join_sides).unwrap();
    let err = Topology::from_map_source(&maps["bad"]).unwrap_err();
    assert!(err.to_string().contains("has neither sides nor join_sides"));
}
