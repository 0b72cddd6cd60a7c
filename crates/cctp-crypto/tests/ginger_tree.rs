//! # Ginger Merkle Tree Scenarios
//!
//! Height-5 tree over the leaves `0..32`: append, finalize both ways,
//! check every path against the root and against an unrelated root.

use cctp_core::{result_code, ErrorCode, FieldElement};
use cctp_crypto::{padding_leaf, GingerMerkleTree};

const HEIGHT: usize = 5;
const CAPACITY: usize = 1 << HEIGHT;

/// Root over the leaves `0..32`.
const EXPECTED_ROOT: &str = "ad1558b417c90f963027a3fa89f47276b517cdbb5e59a50be4331b21583b9e19";

/// The value of an unfilled leaf slot.
const PADDING_LEAF: &str = "a088dc32139a479155902b4363e1ae1bd929651159ebf6b8d3ae502307f4a72c";

fn leaves() -> Vec<FieldElement> {
    (0..CAPACITY as u64).map(FieldElement::from_u64).collect()
}

fn full_tree() -> GingerMerkleTree {
    let mut tree = GingerMerkleTree::new(HEIGHT, CAPACITY).expect("valid dimensions");
    for leaf in leaves() {
        tree.append(&leaf).expect("capacity not reached");
    }
    tree
}

#[test]
fn append_beyond_capacity_fails() {
    let mut tree = full_tree();
    let extra = tree.append(&FieldElement::from_u64(CAPACITY as u64));
    assert_eq!(result_code(&extra), ErrorCode::MerkleTreeError);
    assert_eq!(tree.leaf_count(), CAPACITY);
}

#[test]
fn queries_require_finalization() {
    let tree = full_tree();
    assert_eq!(result_code(&tree.root()), ErrorCode::MerkleRootBuildError);
    assert_eq!(result_code(&tree.get_merkle_path(0)), ErrorCode::MerkleTreeError);
}

#[test]
fn finalize_and_finalize_in_place_agree() {
    let mut tree = full_tree();
    let copy = tree.finalize();
    tree.finalize_in_place();
    assert_eq!(copy.root().unwrap(), tree.root().unwrap());
}

#[test]
fn every_path_verifies_against_root_only() {
    let mut tree = full_tree();
    tree.finalize_in_place();
    let root = tree.root().unwrap();
    let unrelated = FieldElement::random();

    for (i, leaf) in leaves().iter().enumerate() {
        let path = tree.get_merkle_path(i).expect("leaf appended");
        assert_eq!(path.len(), HEIGHT);
        assert!(path.verify(HEIGHT, leaf, &root).unwrap());
        assert!(!path.verify(HEIGHT, leaf, &unrelated).unwrap());
    }
}

#[test]
fn root_matches_known_value() {
    let mut tree = full_tree();
    tree.finalize_in_place();
    assert_eq!(tree.root().unwrap().to_hex(), EXPECTED_ROOT);
    assert_eq!(tree.finalize().root().unwrap().to_hex(), EXPECTED_ROOT);
    assert_eq!(padding_leaf().to_hex(), PADDING_LEAF);
}

#[test]
fn root_is_deterministic() {
    let a = full_tree().finalize().root().unwrap();
    let b = full_tree().finalize().root().unwrap();
    assert_eq!(a, b);
}
