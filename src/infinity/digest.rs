//! Textual form of folded digests: `INF:<depth>:<hex>`

use crate::core::error::{ChainsealError, Result};
use crate::core::types::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "INF";

/// Constant-size summary of the whole folded history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfinityDigest {
    /// Number of batches folded so far
    pub depth: u64,
    /// Accumulator after `depth` folds
    pub value: Hash,
}

impl InfinityDigest {
    pub fn new(depth: u64, value: Hash) -> Self {
        Self { depth, value }
    }

    /// Render with the depth zero-padded to `width` digits
    ///
    /// Padding is display only; [`InfinityDigest::from_str`] accepts both
    /// padded and unpadded depths and they compare equal.
    pub fn display_padded(&self, width: usize) -> String {
        format!(
            "{}:{:0width$}:{}",
            PREFIX,
            self.depth,
            self.value.to_hex(),
            width = width
        )
    }
}

impl fmt::Display for InfinityDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", PREFIX, self.depth, self.value.to_hex())
    }
}

impl FromStr for InfinityDigest {
    type Err = ChainsealError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let (prefix, depth, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(d), Some(v)) => (p, d, v),
            _ => {
                return Err(ChainsealError::invalid_infinity_digest(
                    s,
                    "expected INF:<depth>:<hex>",
                ))
            }
        };

        if prefix != PREFIX {
            return Err(ChainsealError::invalid_infinity_digest(s, "missing INF prefix"));
        }
        if depth.is_empty() || !depth.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ChainsealError::invalid_infinity_digest(
                s,
                "depth must be a decimal integer",
            ));
        }
        let depth: u64 = depth
            .parse()
            .map_err(|_| ChainsealError::invalid_infinity_digest(s, "depth out of range"))?;

        if value.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(ChainsealError::invalid_infinity_digest(s, "hex must be lowercase"));
        }
        let value = Hash::from_hex(value)
            .map_err(|e| ChainsealError::invalid_infinity_digest(s, e.to_string()))?;

        Ok(Self { depth, value })
    }
}

impl Serialize for InfinityDigest {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InfinityDigest {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
