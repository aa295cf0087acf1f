//! Integrity report and chain export documents

use crate::chain::Entry;
use crate::core::error::Result;
use crate::core::types::RootHash;
use crate::infinity::InfinityDigest;
use serde::{Deserialize, Serialize};

/// Export document format version
pub const EXPORT_VERSION: &str = "1.0";

/// Pass/fail verdict over the whole recorded history
///
/// Serialized as
/// `{ valid, errors, checked_entries, merkle_root: hex, infinity_digest: "INF:d:hex", pending_entries }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// No entry fault and no published digest substitution
    pub valid: bool,
    /// Human readable description of every problem found
    pub errors: Vec<String>,
    /// Entries verified
    pub checked_entries: u64,
    /// Merkle root over every entry digest, folded or pending
    pub merkle_root: RootHash,
    /// Digest of the folded batches
    pub infinity_digest: InfinityDigest,
    /// Entries after the last full batch, not yet reflected in `infinity_digest`
    pub pending_entries: u64,
}

impl IntegrityReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Full, self-describing dump of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainExport {
    pub version: String,
    pub chain_length: u64,
    pub merkle_root: RootHash,
    pub infinity_digest: InfinityDigest,
    pub pending_entries: u64,
    pub entries: Vec<Entry>,
}

impl ChainExport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::hash_bytes;

    #[test]
    fn test_report_wire_shape() {
        let report = IntegrityReport {
            valid: true,
            errors: vec![],
            checked_entries: 3,
            merkle_root: hash_bytes(b"root"),
            infinity_digest: InfinityDigest::new(1, hash_bytes(b"acc")),
            pending_entries: 1,
        };

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["valid"], true);
        assert_eq!(value["checked_entries"], 3);
        assert_eq!(value["merkle_root"], hash_bytes(b"root").to_hex());
        assert_eq!(
            value["infinity_digest"],
            format!("INF:1:{}", hash_bytes(b"acc").to_hex())
        );
    }
}
