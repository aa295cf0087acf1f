//! Error types for Chainseal

use thiserror::Error;

/// Main error type for Chainseal operations
///
/// Only caller bugs and I/O problems surface here. Tampered history is an
/// expected outcome of verification and is reported through
/// [`crate::chain::RangeVerification`] instead.
#[derive(Error, Debug)]
pub enum ChainsealError {
    /// Chain errors
    #[error("Ordering violation: expected index {expected}, got {got}")]
    OrderingViolation { expected: u64, got: u64 },

    /// Folding errors
    #[error("Depth mismatch: batches must start at entry {expected_index}, got {got_index}")]
    DepthMismatch { expected_index: u64, got_index: u64 },

    #[error("Out of order fold: expected depth {expected_depth}, got {got_depth}")]
    OutOfOrderFold { expected_depth: u64, got_depth: u64 },

    #[error("Incomplete batch at entry {first_index}: {len} leaves, batch size is {batch_size}")]
    IncompleteBatch {
        first_index: u64,
        len: usize,
        batch_size: usize,
    },

    #[error("Invalid batch size: {size}")]
    InvalidBatchSize { size: usize },

    #[error("Invalid infinity digest '{input}': {reason}")]
    InvalidInfinityDigest { input: String, reason: String },

    /// Event encoding errors
    #[error("Serialization ambiguity in field '{field}': {reason}")]
    SerializationAmbiguity { field: String, reason: String },

    /// Merkle errors
    #[error("Leaf index {index} out of bounds for {leaf_count} leaves")]
    LeafIndexOutOfBounds { index: usize, leaf_count: usize },

    #[error("Entry {index} not found (chain length {len})")]
    EntryNotFound { index: u64, len: u64 },

    /// Journal errors
    #[error("Journal corrupted at offset {offset}: {reason}")]
    JournalCorrupted { offset: u64, reason: String },

    #[error("Journal unusable after a failed append could not be rolled back: {reason}")]
    JournalPoisoned { reason: String },

    /// Configuration errors
    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Hex encoding/decoding errors
    #[error("Hex encoding error: {0}")]
    HexError(#[from] hex::FromHexError),
}

impl ChainsealError {
    /// Create a new ordering violation error
    pub fn ordering_violation(expected: u64, got: u64) -> Self {
        Self::OrderingViolation { expected, got }
    }

    /// Create a new out of order fold error
    pub fn out_of_order_fold(expected_depth: u64, got_depth: u64) -> Self {
        Self::OutOfOrderFold {
            expected_depth,
            got_depth,
        }
    }

    /// Create a new serialization ambiguity error
    pub fn serialization_ambiguity(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SerializationAmbiguity {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid infinity digest error
    pub fn invalid_infinity_digest(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInfinityDigest {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new journal corrupted error
    pub fn journal_corrupted(offset: u64, reason: impl Into<String>) -> Self {
        Self::JournalCorrupted {
            offset,
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }
}

/// Result type alias for Chainseal operations
pub type Result<T> = std::result::Result<T, ChainsealError>;
