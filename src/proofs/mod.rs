//! Merkle accumulator and inclusion proofs
//!
//! Snapshots summarize a run of chain entries under one root; proofs let a
//! replica confirm a single entry against that root without the full set.

pub mod merkle;
pub mod proof;

// Re-export commonly used items
pub use merkle::{compute_root, prove_inclusion, verify_inclusion, CoveredRange, MerkleTree, Snapshot};
pub use proof::{Proof, ProofElement, ProofMetadata, ProofPosition, ProofScope, ProofTarget};
