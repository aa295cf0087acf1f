//! Core types and utilities for Chainseal
//!
//! This module contains the digest type, the digest primitive, error
//! handling and sync tag helpers used throughout the engine.

pub mod error;
pub mod hash;
pub mod sync_tag;
pub mod types;

// Re-export commonly used items
pub use error::{ChainsealError, Result};
pub use hash::{empty_digest, hash_bytes, hash_file, hash_pair};
pub use sync_tag::{sync_tag, verify_sync_tag};
pub use types::{Hash, Timestamp, DIGEST_SIZE};
