//! Merkle accumulator
//!
//! Leaves are paired left to right. When a level has an odd number of nodes
//! the last node is paired with itself, so `parent = H(last ‖ last)`. This
//! padding rule is part of the proof format: a verifier using a different
//! rule (for example promoting the odd node unchanged) will compute
//! different roots. A tree with no leaves has the root `H("")`.

use crate::core::error::{ChainsealError, Result};
use crate::core::hash::{empty_digest, hash_pair};
use crate::core::types::{Hash, RootHash};
use crate::proofs::proof::{ProofElement, ProofPosition};
use serde::{Deserialize, Serialize};

/// Merkle tree built from scratch over an ordered set of leaf digests
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// Root hash of the tree
    root: RootHash,
    /// All levels of the tree (leaves at index 0, root level last)
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a merkle tree from a list of hashes
    pub fn from_hashes(hashes: &[Hash]) -> Self {
        if hashes.is_empty() {
            return Self {
                root: empty_digest(),
                levels: vec![Vec::new()],
            };
        }

        let mut levels = vec![hashes.to_vec()];
        while levels[levels.len() - 1].len() > 1 {
            let current = &levels[levels.len() - 1];
            let next: Vec<Hash> = current
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    hash_pair(left, right)
                })
                .collect();
            levels.push(next);
        }

        let root = levels[levels.len() - 1][0];
        Self { root, levels }
    }

    /// Root hash
    pub fn root(&self) -> RootHash {
        self.root
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of levels above the leaves
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Generate the sibling path for a specific leaf index
    pub fn generate_proof(&self, leaf_index: usize) -> Result<Vec<ProofElement>> {
        let leaf_count = self.leaf_count();
        if leaf_index >= leaf_count {
            return Err(ChainsealError::LeafIndexOutOfBounds {
                index: leaf_index,
                leaf_count,
            });
        }

        let mut path = Vec::with_capacity(self.height());
        let mut index = leaf_index;
        for level in &self.levels[..self.levels.len() - 1] {
            let element = if index % 2 == 0 {
                // Missing right sibling means the node was paired with itself
                let sibling = level.get(index + 1).unwrap_or(&level[index]);
                ProofElement {
                    hash: *sibling,
                    position: ProofPosition::Right,
                }
            } else {
                ProofElement {
                    hash: level[index - 1],
                    position: ProofPosition::Left,
                }
            };
            path.push(element);
            index /= 2;
        }

        Ok(path)
    }

    /// Verify a proof against this tree's root
    pub fn verify_proof(&self, leaf_hash: Hash, proof: &[ProofElement]) -> bool {
        verify_inclusion(leaf_hash, proof, self.root)
    }
}

/// Fold a leaf up through its sibling path
pub fn compute_root(leaf_hash: Hash, proof: &[ProofElement]) -> RootHash {
    proof.iter().fold(leaf_hash, |acc, element| match element.position {
        ProofPosition::Left => hash_pair(&element.hash, &acc),
        ProofPosition::Right => hash_pair(&acc, &element.hash),
    })
}

/// Check that `leaf_hash` with `proof` leads to `expected_root`
pub fn verify_inclusion(leaf_hash: Hash, proof: &[ProofElement], expected_root: RootHash) -> bool {
    compute_root(leaf_hash, proof) == expected_root
}

/// Sibling path for `leaf_index` within `leaf_digests`
pub fn prove_inclusion(leaf_index: usize, leaf_digests: &[Hash]) -> Result<Vec<ProofElement>> {
    MerkleTree::from_hashes(leaf_digests).generate_proof(leaf_index)
}

/// Inclusive range of chain indices summarized by a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveredRange {
    pub start: u64,
    pub end: u64,
}

/// Merkle summary of a contiguous run of chain entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Root over the covered entry digests
    pub root: RootHash,
    /// Number of leaves
    pub leaf_count: u64,
    /// Chain indices covered, `None` for an empty snapshot
    pub covered_range: Option<CoveredRange>,
}

impl Snapshot {
    /// Build a snapshot over leaves that start at chain index `first_index`
    pub fn build(first_index: u64, leaf_digests: &[Hash]) -> Self {
        let tree = MerkleTree::from_hashes(leaf_digests);
        let leaf_count = leaf_digests.len() as u64;
        let covered_range = (leaf_count > 0).then(|| CoveredRange {
            start: first_index,
            end: first_index + leaf_count - 1,
        });
        Self {
            root: tree.root(),
            leaf_count,
            covered_range,
        }
    }

    /// First chain index covered
    pub fn first_index(&self) -> Option<u64> {
        self.covered_range.map(|r| r.start)
    }
}
