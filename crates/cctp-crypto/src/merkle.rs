//! # Ginger Merkle Tree
//!
//! A fixed-height, fixed-capacity, append-only binary tree over
//! [`FieldElement`] leaves. Internal nodes are the two-to-one Poseidon
//! compression of their children.
//!
//! ## Padding
//!
//! Every leaf slot that was never appended holds [`padding_leaf`], a
//! domain-separated constant rather than zero. An appended zero leaf and
//! an empty slot therefore commit to different roots. The root of a fully
//! empty subtree of height `h` is precomputed once per process
//! ([`empty_subtree_root`]), so finalization only hashes the populated
//! part of the tree.
//!
//! ## Lifecycle
//!
//! `new` → `append`* → `finalize_in_place` (or `finalize` for a finalized
//! copy). Root and path queries are only answered on finalized trees and
//! appends are refused after finalization until `reset`. Both finalize
//! entry points go through the same pure builder, so they produce
//! identical roots and paths.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use cctp_core::FieldElement;

use crate::error::MerkleTreeError;
use crate::poseidon::{domain_constant, hash_two};

/// Largest supported tree height.
pub const MAX_MERKLE_HEIGHT: usize = 32;

const PADDING_LEAF_TAG: &[u8] = b"ginger-mht-padding-leaf";

static EMPTY_SUBTREE_ROOTS: Lazy<Vec<FieldElement>> = Lazy::new(|| {
    let mut roots = Vec::with_capacity(MAX_MERKLE_HEIGHT + 1);
    let mut node = domain_constant(PADDING_LEAF_TAG);
    roots.push(node);
    for _ in 0..MAX_MERKLE_HEIGHT {
        node = hash_two(&node, &node);
        roots.push(node);
    }
    roots
});

/// The value of an unfilled leaf slot.
pub fn padding_leaf() -> FieldElement {
    EMPTY_SUBTREE_ROOTS[0]
}

/// Root of a subtree of the given height whose leaves are all padding.
///
/// Heights above [`MAX_MERKLE_HEIGHT`] are clamped.
pub fn empty_subtree_root(height: usize) -> FieldElement {
    EMPTY_SUBTREE_ROOTS[height.min(MAX_MERKLE_HEIGHT)]
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Append-only Poseidon Merkle tree of fixed height.
#[derive(Debug, Clone)]
pub struct GingerMerkleTree {
    height: usize,
    capacity: usize,
    leaves: Vec<FieldElement>,
    /// Populated prefix of every level, leaves first; `Some` once finalized.
    levels: Option<Vec<Vec<FieldElement>>>,
}

impl GingerMerkleTree {
    /// Create an empty tree holding at most `capacity` leaves.
    ///
    /// `capacity` must be nonzero and at most `2^height`.
    pub fn new(height: usize, capacity: usize) -> Result<Self, MerkleTreeError> {
        let max_leaves = 1u64.checked_shl(height as u32).unwrap_or(0);
        if height > MAX_MERKLE_HEIGHT || capacity == 0 || capacity as u64 > max_leaves {
            return Err(MerkleTreeError::InvalidDimensions { height, capacity });
        }
        Ok(Self {
            height,
            capacity,
            leaves: Vec::new(),
            levels: None,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of leaves appended so far.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.levels.is_some()
    }

    /// Append a leaf. Fails without mutating the tree when it is full or
    /// already finalized.
    pub fn append(&mut self, leaf: &FieldElement) -> Result<(), MerkleTreeError> {
        if self.is_finalized() {
            return Err(MerkleTreeError::AlreadyFinalized);
        }
        if self.leaves.len() >= self.capacity {
            return Err(MerkleTreeError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.leaves.push(*leaf);
        Ok(())
    }

    /// Return a finalized copy of this tree. `self` is left untouched.
    pub fn finalize(&self) -> GingerMerkleTree {
        let mut copy = self.clone();
        copy.finalize_in_place();
        copy
    }

    /// Finalize this tree. A no-op on an already finalized tree.
    pub fn finalize_in_place(&mut self) -> &mut Self {
        if self.levels.is_none() {
            self.levels = Some(build_levels(self.height, &self.leaves));
        }
        self
    }

    /// Root of the finalized tree.
    pub fn root(&self) -> Result<FieldElement, MerkleTreeError> {
        let levels = self.levels.as_ref().ok_or(MerkleTreeError::RootNotBuilt)?;
        Ok(levels
            .get(self.height)
            .and_then(|top| top.first().copied())
            .unwrap_or_else(|| empty_subtree_root(self.height)))
    }

    /// Inclusion path of the leaf at `index`.
    pub fn get_merkle_path(&self, index: usize) -> Result<MerklePath, MerkleTreeError> {
        let levels = self.levels.as_ref().ok_or(MerkleTreeError::NotFinalized)?;
        if index >= self.leaves.len() {
            return Err(MerkleTreeError::LeafIndexOutOfRange {
                index,
                leaves: self.leaves.len(),
            });
        }

        let mut nodes = Vec::with_capacity(self.height);
        let mut position = index;
        for (depth, level) in levels.iter().take(self.height).enumerate() {
            let sibling = level
                .get(position ^ 1)
                .copied()
                .unwrap_or_else(|| empty_subtree_root(depth));
            nodes.push((sibling, position & 1 == 1));
            position >>= 1;
        }
        Ok(MerklePath { nodes })
    }

    /// Drop all leaves and return to the unfinalized state.
    pub fn reset(&mut self) {
        self.leaves.clear();
        self.levels = None;
    }
}

/// Hash the populated prefix of each level, leaves first. Missing right
/// siblings are the empty subtree root of that level.
fn build_levels(height: usize, leaves: &[FieldElement]) -> Vec<Vec<FieldElement>> {
    let mut levels = Vec::with_capacity(height + 1);
    levels.push(leaves.to_vec());
    for depth in 0..height {
        let below = &levels[depth];
        let above: Vec<FieldElement> = below
            .chunks(2)
            .map(|pair| {
                let right = pair.get(1).copied().unwrap_or_else(|| empty_subtree_root(depth));
                hash_two(&pair[0], &right)
            })
            .collect();
        levels.push(above);
    }
    levels
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// Inclusion path from a leaf to the root.
///
/// Each entry is the sibling at that level and whether the node on the
/// path is the right child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    nodes: Vec<(FieldElement, bool)>,
}

impl MerklePath {
    pub fn new(nodes: Vec<(FieldElement, bool)>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[(FieldElement, bool)] {
        &self.nodes
    }

    /// Number of levels, equal to the height of the tree it came from.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of the leaf, recovered from the direction bits.
    pub fn leaf_index(&self) -> u64 {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, (_, is_right))| *is_right)
            .fold(0u64, |acc, (depth, _)| acc | (1u64 << depth))
    }

    /// Whether the path leads to the first leaf slot.
    pub fn is_leftmost(&self) -> bool {
        self.nodes.iter().all(|(_, is_right)| !is_right)
    }

    /// Whether the path leads to the last leaf slot of a full tree.
    pub fn is_rightmost(&self) -> bool {
        self.nodes.iter().all(|(_, is_right)| *is_right)
    }

    /// Recompute the root reached from `leaf`.
    pub fn compute_root(&self, leaf: &FieldElement) -> FieldElement {
        self.nodes
            .iter()
            .fold(*leaf, |node, (sibling, is_right)| {
                if *is_right {
                    hash_two(sibling, &node)
                } else {
                    hash_two(&node, sibling)
                }
            })
    }

    /// Check that `leaf` sits under `root` in a tree of `height`.
    pub fn verify(
        &self,
        height: usize,
        leaf: &FieldElement,
        root: &FieldElement,
    ) -> Result<bool, MerkleTreeError> {
        if self.nodes.len() != height {
            return Err(MerkleTreeError::PathLength {
                expected: height,
                actual: self.nodes.len(),
            });
        }
        Ok(self.compute_root(leaf) == *root)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cctp_core::{CodedError, ErrorCode};

    fn fe(n: u64) -> FieldElement {
        FieldElement::from_u64(n)
    }

    fn filled(height: usize, capacity: usize, count: u64) -> GingerMerkleTree {
        let mut tree = GingerMerkleTree::new(height, capacity).unwrap();
        for i in 0..count {
            tree.append(&fe(i)).unwrap();
        }
        tree
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(GingerMerkleTree::new(3, 0).is_err());
        assert!(GingerMerkleTree::new(3, 9).is_err());
        assert!(GingerMerkleTree::new(MAX_MERKLE_HEIGHT + 1, 1).is_err());
        assert!(GingerMerkleTree::new(0, 1).is_ok());
        assert!(GingerMerkleTree::new(3, 8).is_ok());
    }

    #[test]
    fn test_root_of_two_leaves() {
        let mut tree = filled(1, 2, 2);
        tree.finalize_in_place();
        assert_eq!(tree.root().unwrap(), hash_two(&fe(0), &fe(1)));
    }

    #[test]
    fn test_single_leaf_is_padded() {
        let mut tree = filled(2, 4, 1);
        tree.finalize_in_place();
        let expected = hash_two(
            &hash_two(&fe(0), &padding_leaf()),
            &empty_subtree_root(1),
        );
        assert_eq!(tree.root().unwrap(), expected);
    }

    #[test]
    fn test_empty_tree_root() {
        let mut tree = GingerMerkleTree::new(4, 16).unwrap();
        tree.finalize_in_place();
        assert_eq!(tree.root().unwrap(), empty_subtree_root(4));
    }

    #[test]
    fn test_height_zero_tree() {
        let mut tree = filled(0, 1, 1);
        tree.finalize_in_place();
        assert_eq!(tree.root().unwrap(), fe(0));
        let path = tree.get_merkle_path(0).unwrap();
        assert!(path.is_empty());
        assert!(path.verify(0, &fe(0), &fe(0)).unwrap());
    }

    #[test]
    fn test_zero_leaf_differs_from_empty_slot() {
        let mut with_zero = filled(3, 8, 3);
        with_zero.append(&FieldElement::zero()).unwrap();
        with_zero.finalize_in_place();

        let mut without = filled(3, 8, 3);
        without.finalize_in_place();

        assert_ne!(with_zero.root().unwrap(), without.root().unwrap());
    }

    #[test]
    fn test_root_independent_of_capacity() {
        let small = filled(4, 5, 5).finalize();
        let large = filled(4, 16, 5).finalize();
        assert_eq!(small.root().unwrap(), large.root().unwrap());
    }

    #[test]
    fn test_append_after_finalize_rejected() {
        let mut tree = filled(2, 4, 1);
        tree.finalize_in_place();
        assert_eq!(tree.append(&fe(1)), Err(MerkleTreeError::AlreadyFinalized));
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_queries_before_finalize() {
        let tree = filled(2, 4, 2);
        let root_err = tree.root().unwrap_err();
        assert_eq!(root_err.code(), ErrorCode::MerkleRootBuildError);
        let path_err = tree.get_merkle_path(0).unwrap_err();
        assert_eq!(path_err.code(), ErrorCode::MerkleTreeError);
    }

    #[test]
    fn test_path_index_out_of_range() {
        let tree = filled(3, 8, 3).finalize();
        assert_eq!(
            tree.get_merkle_path(3).unwrap_err(),
            MerkleTreeError::LeafIndexOutOfRange { index: 3, leaves: 3 }
        );
    }

    #[test]
    fn test_partial_tree_paths_verify() {
        let tree = filled(4, 16, 7).finalize();
        let root = tree.root().unwrap();
        for i in 0..7 {
            let path = tree.get_merkle_path(i).unwrap();
            assert_eq!(path.leaf_index(), i as u64);
            assert!(path.verify(4, &fe(i as u64), &root).unwrap());
            assert!(!path.verify(4, &fe(100), &root).unwrap());
        }
    }

    #[test]
    fn test_path_length_mismatch() {
        let tree = filled(3, 8, 2).finalize();
        let path = tree.get_merkle_path(0).unwrap();
        let err = path.verify(4, &fe(0), &tree.root().unwrap()).unwrap_err();
        assert_eq!(err, MerkleTreeError::PathLength { expected: 4, actual: 3 });
    }

    #[test]
    fn test_leftmost_rightmost() {
        let tree = filled(2, 4, 4).finalize();
        assert!(tree.get_merkle_path(0).unwrap().is_leftmost());
        assert!(!tree.get_merkle_path(0).unwrap().is_rightmost());
        assert!(tree.get_merkle_path(3).unwrap().is_rightmost());
        assert!(!tree.get_merkle_path(1).unwrap().is_leftmost());
    }

    #[test]
    fn test_reset() {
        let mut tree = filled(2, 4, 4);
        tree.finalize_in_place();
        tree.reset();
        assert!(!tree.is_finalized());
        assert_eq!(tree.leaf_count(), 0);
        tree.append(&fe(1)).unwrap();
    }

    #[test]
    fn test_path_serde_roundtrip() {
        let tree = filled(3, 8, 5).finalize();
        let path = tree.get_merkle_path(4).unwrap();
        let json = serde_json::to_string(&path).unwrap();
        let back: MerklePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
