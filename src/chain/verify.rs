//! Range verification outcomes
//!
//! Verifying untrusted history is a normal operation, so faults are values,
//! never errors.

use crate::core::types::EntryDigest;
use serde::Serialize;
use thiserror::Error;

/// A single problem found while verifying a range of the chain
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationFault {
    #[error("entry {index}: digest mismatch (stored {stored}, computed {computed})")]
    DigestMismatch {
        index: u64,
        stored: EntryDigest,
        computed: EntryDigest,
    },

    #[error("entry {index}: prev_digest does not match digest of entry {}", index - 1)]
    BrokenLink { index: u64 },

    #[error("entry at position {position}: stored index is {found}")]
    IndexMismatch { position: u64, found: u64 },

    #[error("entry {index}: missing prev_digest")]
    MissingPrevDigest { index: u64 },

    #[error("entry 0: prev_digest must be empty")]
    UnexpectedPrevDigest,

    #[error("range end {end} is beyond the chain tail {tail}")]
    RangeBeyondTail { end: u64, tail: u64 },
}

impl VerificationFault {
    /// Index of the offending entry, if the fault concerns one
    pub fn index(&self) -> Option<u64> {
        match self {
            Self::DigestMismatch { index, .. }
            | Self::BrokenLink { index }
            | Self::MissingPrevDigest { index } => Some(*index),
            Self::IndexMismatch { position, .. } => Some(*position),
            Self::UnexpectedPrevDigest => Some(0),
            Self::RangeBeyondTail { .. } => None,
        }
    }
}

/// Result of `HashChain::verify_range`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeVerification {
    /// Number of entries examined
    pub checked: u64,
    /// Every fault found, in ascending entry order
    pub faults: Vec<VerificationFault>,
}

impl RangeVerification {
    /// True when no fault was recorded
    pub fn is_valid(&self) -> bool {
        self.faults.is_empty()
    }

    /// Sorted, deduplicated indices of entries that failed
    pub fn failed_indices(&self) -> Vec<u64> {
        let mut indices: Vec<u64> = self.faults.iter().filter_map(|f| f.index()).collect();
        indices.dedup();
        indices
    }

    /// Faults rendered as human readable messages
    pub fn messages(&self) -> Vec<String> {
        self.faults.iter().map(|f| f.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_indices_deduplicates() {
        let verification = RangeVerification {
            checked: 5,
            faults: vec![
                VerificationFault::BrokenLink { index: 2 },
                VerificationFault::MissingPrevDigest { index: 2 },
                VerificationFault::BrokenLink { index: 4 },
            ],
        };
        assert!(!verification.is_valid());
        assert_eq!(verification.failed_indices(), vec![2, 4]);
    }

    #[test]
    fn test_messages_name_the_entry() {
        let fault = VerificationFault::BrokenLink { index: 7 };
        assert_eq!(
            fault.to_string(),
            "entry 7: prev_digest does not match digest of entry 6"
        );
    }
}
