//! Epoch-partitioned append-only Merkle tree (§4.5).
//!
//! Depth 12, up to 4096 leaves. Incremental node storage follows the same
//! per-leaf path update the teacher's Tornado-style tree used: every insert
//! only touches the O(log N) nodes on the new leaf's path to the root,
//! using the zero-hash of a level wherever a sibling hasn't been written
//! yet. This reproduces the full O(N log N) recomputation's root bit for
//! bit while staying O(log N) per insert, which the spec explicitly
//! permits.

mod zero_hashes;

use std::collections::HashMap;

use crate::error::MerkleError;
use crate::poseidon;

pub use zero_hashes::ZERO_HASHES;

pub const DEPTH: usize = 12;
pub const MAX_LEAVES: u32 = 1 << DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochState {
    Active,
    Frozen,
    Finalized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub leaf: [u8; 32],
    pub leaf_index: u32,
    pub epoch: u64,
    pub siblings: Vec<[u8; 32]>,
    pub root: [u8; 32],
}

#[derive(Debug, Clone)]
pub struct EpochTree {
    pub epoch: u64,
    pub state: EpochState,
    leaves: HashMap<u32, [u8; 32]>,
    nodes: HashMap<(usize, u32), [u8; 32]>,
    next_index: u32,
    root_history: Vec<[u8; 32]>,
    final_root: Option<[u8; 32]>,
}

impl EpochTree {
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            state: EpochState::Active,
            leaves: HashMap::new(),
            nodes: HashMap::new(),
            next_index: 0,
            root_history: Vec::new(),
            final_root: None,
        }
    }

    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    fn node_or_zero(&self, level: usize, index: u32) -> [u8; 32] {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or(ZERO_HASHES[level])
    }

    /// Recompute every node on `leaf_index`'s path to the root, writing
    /// each level's node into `self.nodes`. Returns the new root.
    fn update_path(&mut self, leaf_index: u32) -> [u8; 32] {
        let mut index = leaf_index;
        let mut hash = self.leaves[&leaf_index];
        self.nodes.insert((0, index), hash);

        for level in 1..=DEPTH {
            let sibling_index = index ^ 1;
            let sibling = self.node_or_zero(level - 1, sibling_index);
            let (left, right) = if index % 2 == 0 {
                (hash, sibling)
            } else {
                (sibling, hash)
            };
            hash = poseidon::hash2(left, right).expect("width 3 poseidon is always available");
            index /= 2;
            self.nodes.insert((level, index), hash);
        }

        hash
    }

    pub fn insert(&mut self, leaf: [u8; 32]) -> Result<(u32, [u8; 32]), MerkleError> {
        if self.state != EpochState::Active {
            return Err(MerkleError::EpochNotActive);
        }
        if self.next_index >= MAX_LEAVES {
            return Err(MerkleError::TreeFull);
        }

        let leaf_index = self.next_index;
        self.leaves.insert(leaf_index, leaf);
        let root = self.update_path(leaf_index);
        self.next_index += 1;
        self.root_history.push(root);
        Ok((leaf_index, root))
    }

    /// Bulk insert: recomputes paths for every leaf but only records the
    /// final root in history once, matching §4.5's bulk-variant contract.
    pub fn insert_many(&mut self, leaves: &[[u8; 32]]) -> Result<Vec<u32>, MerkleError> {
        let mut indices = Vec::with_capacity(leaves.len());
        let mut root = self.root();
        for &leaf in leaves {
            if self.state != EpochState::Active {
                return Err(MerkleError::EpochNotActive);
            }
            if self.next_index >= MAX_LEAVES {
                return Err(MerkleError::TreeFull);
            }
            let leaf_index = self.next_index;
            self.leaves.insert(leaf_index, leaf);
            root = self.update_path(leaf_index);
            self.next_index += 1;
            indices.push(leaf_index);
        }
        if !leaves.is_empty() {
            self.root_history.push(root);
        }
        Ok(indices)
    }

    pub fn root(&self) -> [u8; 32] {
        self.final_root
            .or_else(|| self.root_history.last().copied())
            .unwrap_or(ZERO_HASHES[DEPTH])
    }

    pub fn is_known_root(&self, root: &[u8; 32]) -> bool {
        self.final_root.as_ref() == Some(root) || self.root_history.contains(root)
    }

    pub fn proof(&self, leaf_index: u32) -> Result<MerkleProof, MerkleError> {
        let leaf = *self
            .leaves
            .get(&leaf_index)
            .ok_or(MerkleError::LeafNotFound(leaf_index))?;

        let mut siblings = Vec::with_capacity(DEPTH);
        let mut index = leaf_index;
        for level in 0..DEPTH {
            let sibling_index = index ^ 1;
            siblings.push(self.node_or_zero(level, sibling_index));
            index /= 2;
        }

        Ok(MerkleProof {
            leaf,
            leaf_index,
            epoch: self.epoch,
            siblings,
            root: self.root(),
        })
    }

    pub fn verify_proof(proof: &MerkleProof) -> bool {
        if proof.siblings.len() != DEPTH {
            return false;
        }
        let mut current = proof.leaf;
        for (level, sibling) in proof.siblings.iter().enumerate() {
            let bit = (proof.leaf_index >> level) & 1;
            current = match poseidon::hash2(
                if bit == 0 { current } else { *sibling },
                if bit == 0 { *sibling } else { current },
            ) {
                Ok(h) => h,
                Err(_) => return false,
            };
        }
        current == proof.root
    }

    pub fn set_final_root(&mut self, root: [u8; 32]) {
        self.state = EpochState::Finalized;
        self.final_root = Some(root);
    }

    pub fn freeze(&mut self) {
        if self.state == EpochState::Active {
            self.state = EpochState::Frozen;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_root_is_depth_12_zero_hash() {
        let tree = EpochTree::new(0);
        assert_eq!(tree.root(), ZERO_HASHES[DEPTH]);
    }

    #[test]
    fn insert_then_verify_round_trips() {
        let mut tree = EpochTree::new(0);
        let (idx, root) = tree.insert([7u8; 32]).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(root, tree.root());

        let proof = tree.proof(idx).unwrap();
        assert!(EpochTree::verify_proof(&proof));
    }

    #[test]
    fn random_root_rejected() {
        let mut tree = EpochTree::new(0);
        let (idx, _) = tree.insert([7u8; 32]).unwrap();
        let mut proof = tree.proof(idx).unwrap();
        proof.root = [0xEE; 32];
        assert!(!EpochTree::verify_proof(&proof));
    }

    #[test]
    fn root_history_tracks_each_insert() {
        let mut tree = EpochTree::new(0);
        let (_, r1) = tree.insert([1u8; 32]).unwrap();
        let (_, r2) = tree.insert([2u8; 32]).unwrap();
        assert!(tree.is_known_root(&r1));
        assert!(tree.is_known_root(&r2));
        assert!(!tree.is_known_root(&[0xAB; 32]));
    }

    #[test]
    fn insert_into_finalized_epoch_fails() {
        let mut tree = EpochTree::new(0);
        tree.set_final_root([1u8; 32]);
        assert_eq!(tree.insert([2u8; 32]), Err(MerkleError::EpochNotActive));
        assert!(tree.is_known_root(&[1u8; 32]));
    }

    #[test]
    fn full_tree_rejects_further_inserts() {
        let mut tree = EpochTree::new(0);
        tree.next_index = MAX_LEAVES;
        assert_eq!(tree.insert([1u8; 32]), Err(MerkleError::TreeFull));
    }

    #[test]
    fn proof_for_unknown_leaf_fails() {
        let tree = EpochTree::new(0);
        assert_eq!(tree.proof(3), Err(MerkleError::LeafNotFound(3)));
    }

    #[test]
    fn insert_many_appends_a_single_root() {
        let mut tree = EpochTree::new(0);
        let before = tree.root_history.len();
        tree.insert_many(&[[1u8; 32], [2u8; 32], [3u8; 32]]).unwrap();
        assert_eq!(tree.root_history.len(), before + 1);
        assert_eq!(tree.next_index(), 3);
        for i in 0..3 {
            assert!(EpochTree::verify_proof(&tree.proof(i).unwrap()));
        }
    }
}
