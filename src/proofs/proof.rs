//! Portable inclusion proofs
//!
//! A [`Proof`] carries everything a replica needs to check that one entry
//! belongs to a Merkle snapshot without holding the rest of the history.

use crate::core::error::{ChainsealError, Result};
use crate::core::types::{EntryDigest, RootHash};
use crate::proofs::merkle::{verify_inclusion, CoveredRange, MerkleTree};
use serde::{Deserialize, Serialize};

/// Current proof document version
pub const PROOF_VERSION: &str = "1.0";

/// A single element in a merkle proof path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofElement {
    /// Hash of the sibling node
    pub hash: EntryDigest,
    /// Whether the sibling is on the left or right
    pub position: ProofPosition,
}

/// Position of a sibling in a merkle proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofPosition {
    Left,
    Right,
}

/// Which snapshot the proof's root belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProofScope {
    /// A completed batch, folded at `depth`
    Batch { depth: u64 },
    /// Entries after the last completed batch
    PendingTail,
}

/// Entry being proved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofTarget {
    /// Chain index of the entry
    pub index: u64,
    /// Digest of the entry (the Merkle leaf)
    pub digest: EntryDigest,
}

/// Metadata included with proofs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMetadata {
    /// Unix timestamp when the proof was generated
    pub generated_at: i64,
    /// Chain length at generation time
    pub chain_length: u64,
}

/// Complete inclusion proof document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Version of the proof format
    pub version: String,
    /// Entry being proved
    pub target: ProofTarget,
    /// Snapshot the root belongs to
    pub scope: ProofScope,
    /// Chain indices summarized by the root
    pub covered_range: CoveredRange,
    /// Root hash to verify against
    pub root: RootHash,
    /// Sibling path from the leaf up to the root
    pub proof_path: Vec<ProofElement>,
    /// Additional metadata
    pub metadata: ProofMetadata,
}

impl Proof {
    /// Prove the entry at `index` within leaves starting at `first_index`
    pub fn generate(
        index: u64,
        first_index: u64,
        leaves: &[EntryDigest],
        scope: ProofScope,
        chain_length: u64,
    ) -> Result<Self> {
        if index < first_index {
            return Err(ChainsealError::LeafIndexOutOfBounds {
                index: index as usize,
                leaf_count: leaves.len(),
            });
        }
        let position = (index - first_index) as usize;
        let tree = MerkleTree::from_hashes(leaves);
        let proof_path = tree.generate_proof(position)?;

        Ok(Proof {
            version: PROOF_VERSION.to_string(),
            target: ProofTarget {
                index,
                digest: leaves[position],
            },
            scope,
            covered_range: CoveredRange {
                start: first_index,
                end: first_index + leaves.len() as u64 - 1,
            },
            root: tree.root(),
            proof_path,
            metadata: ProofMetadata {
                generated_at: chrono::Utc::now().timestamp(),
                chain_length,
            },
        })
    }

    /// Check the path against the root carried by the proof
    pub fn verify(&self) -> bool {
        self.target.index >= self.covered_range.start
            && self.target.index <= self.covered_range.end
            && verify_inclusion(self.target.digest, &self.proof_path, self.root)
    }

    /// Check the path against a root obtained independently
    pub fn verify_against(&self, expected_root: RootHash) -> bool {
        self.root == expected_root && self.verify()
    }

    /// Serialize to pretty JSON for exchange
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a proof received from another replica
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::hash_bytes;

    fn leaves(n: u64) -> Vec<EntryDigest> {
        (0..n).map(|i| hash_bytes(&i.to_be_bytes())).collect()
    }

    #[test]
    fn test_generate_and_verify() -> Result<()> {
        let l = leaves(4);
        let proof = Proof::generate(6, 4, &l, ProofScope::Batch { depth: 1 }, 9)?;

        assert_eq!(proof.target.digest, l[2]);
        assert_eq!(proof.covered_range, CoveredRange { start: 4, end: 7 });
        assert!(proof.verify());
        assert!(proof.verify_against(MerkleTree::from_hashes(&l).root()));
        Ok(())
    }

    #[test]
    fn test_json_exchange() -> Result<()> {
        let proof = Proof::generate(0, 0, &leaves(3), ProofScope::PendingTail, 3)?;
        let received = Proof::from_json(&proof.to_json()?)?;
        assert_eq!(received, proof);
        assert!(received.verify());
        Ok(())
    }

    #[test]
    fn test_substituted_leaf_fails() -> Result<()> {
        let mut proof = Proof::generate(1, 0, &leaves(5), ProofScope::PendingTail, 5)?;
        proof.target.digest = hash_bytes(b"forged");
        assert!(!proof.verify());
        Ok(())
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        assert!(Proof::generate(9, 0, &leaves(2), ProofScope::PendingTail, 2).is_err());
    }
}
