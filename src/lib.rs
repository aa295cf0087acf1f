//! Chainseal - tamper-evident event history
//!
//! Chainseal records the events of a system of record (task board cards,
//! pull requests, endpoint checks) in an append-only hash chain and lets any
//! replica prove that the history was not altered, reordered or truncated.
//!
//! # Core Features
//!
//! - **Hash Chain**: every entry commits to its index, content, timestamp and
//!   the previous entry's digest
//! - **Merkle Snapshots**: completed batches are summarized under one root
//!   with logarithmic inclusion proofs
//! - **Infinity Digest**: batch roots are folded into a constant-size
//!   `INF:<depth>:<hex>` digest that can be advanced from any earlier depth
//! - **Integrity Reports**: pass/fail verdict with every fault enumerated,
//!   checked against the last published digest
//!
//! # Example Usage
//!
//! ```rust
//! use chainseal::{EngineConfig, IntegrityEngine};
//!
//! let config = EngineConfig { batch_size: 2, ..EngineConfig::default() };
//! let engine = IntegrityEngine::new(config)?;
//!
//! for content in ["a", "b", "c"] {
//!     engine.append(content.as_bytes().to_vec(), chrono::Utc::now())?;
//! }
//!
//! let report = engine.get_integrity_report();
//! assert!(report.valid);
//! assert_eq!(report.checked_entries, 3);
//! assert_eq!(report.infinity_digest.depth, 1);
//! # Ok::<(), chainseal::ChainsealError>(())
//! ```

pub mod chain;
pub mod cli;
pub mod config;
pub mod core;
pub mod infinity;
pub mod proofs;
pub mod report;

// Re-export commonly used types
pub use crate::core::{
    error::{ChainsealError, Result},
    types::{Hash, Timestamp},
};

pub use chain::{Entry, HashChain, RangeVerification, VerificationFault};

pub use config::EngineConfig;

pub use infinity::{Batch, InfinityDigest, InfinityHasher};

pub use proofs::{
    merkle::{MerkleTree, Snapshot},
    proof::{Proof, ProofElement, ProofPosition},
};

pub use report::{ChainExport, IntegrityEngine, IntegrityReport, LedgerEvent};

/// Current version of Chainseal
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
