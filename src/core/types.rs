//! Core data types for Chainseal

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width in bytes of every digest produced by the engine
pub const DIGEST_SIZE: usize = 32;

/// 32-byte SHA-256 digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; DIGEST_SIZE]);

impl Hash {
    /// Create a Hash from a 32-byte array
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Create a Hash from a hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex)?;
        if bytes.len() != DIGEST_SIZE {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut array = [0u8; DIGEST_SIZE];
        array.copy_from_slice(&bytes);
        Ok(Hash(array))
    }

    /// Convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create a zero hash (for testing and special cases)
    pub fn zero() -> Self {
        Hash([0u8; DIGEST_SIZE])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &hex::encode(self.0)[..8])
    }
}

impl From<[u8; DIGEST_SIZE]> for Hash {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

// Hex strings on the wire instead of byte arrays
impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        Hash::from_hex(&hex_string).map_err(serde::de::Error::custom)
    }
}

/// Digest of a single chain entry
pub type EntryDigest = Hash;

/// Root digest of a Merkle snapshot
pub type RootHash = Hash;

/// Instant attached to every chain entry
pub type Timestamp = chrono::DateTime<chrono::Utc>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_lowercase() {
        let hash = Hash::from_bytes([0xAB; DIGEST_SIZE]);
        assert_eq!(hash.to_hex(), "ab".repeat(DIGEST_SIZE));
        assert_eq!(hash.to_string(), hash.to_hex());
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Hash::from_hex("abcd").is_err());
        assert!(Hash::from_hex(&"0".repeat(64)).is_ok());
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let hash = Hash::from_bytes([7u8; DIGEST_SIZE]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(DIGEST_SIZE)));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
