//! Chain entries and their digest preimage

use crate::core::hash::StreamingHasher;
use crate::core::types::{EntryDigest, Timestamp};
use serde::{Deserialize, Serialize};

/// A single record in the hash chain
///
/// `digest` commits to the index, the content, the previous entry's digest
/// and the timestamp. The chain hands out clones; its own copies are never
/// mutated after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Position in the chain, starting at 0
    pub index: u64,
    /// Opaque event payload
    #[serde(with = "content_hex")]
    pub content: Vec<u8>,
    /// Instant supplied by the appender
    pub timestamp: Timestamp,
    /// Digest of entry `index - 1`, absent only for the first entry
    pub prev_digest: Option<EntryDigest>,
    /// Digest of this entry
    pub digest: EntryDigest,
}

impl Entry {
    /// Build an entry, computing its digest
    pub fn new(
        index: u64,
        content: Vec<u8>,
        timestamp: Timestamp,
        prev_digest: Option<EntryDigest>,
    ) -> Self {
        let digest = compute_digest(index, &content, prev_digest.as_ref(), &timestamp);
        Self {
            index,
            content,
            timestamp,
            prev_digest,
            digest,
        }
    }

    /// Recompute the digest from the stored fields
    pub fn recompute_digest(&self) -> EntryDigest {
        compute_digest(
            self.index,
            &self.content,
            self.prev_digest.as_ref(),
            &self.timestamp,
        )
    }

    /// Whether the stored digest matches the stored fields
    pub fn is_self_consistent(&self) -> bool {
        self.recompute_digest() == self.digest
    }
}

/// Digest over `index ‖ content ‖ prev_digest ‖ timestamp`
///
/// Layout: index (u64 BE), content length (u64 BE), content, a presence byte
/// for the previous digest followed by its 32 bytes when present, then the
/// timestamp as seconds (i64 BE) and subsecond nanos (u32 BE). Length and
/// presence prefixes keep distinct entries from sharing a preimage.
pub fn compute_digest(
    index: u64,
    content: &[u8],
    prev_digest: Option<&EntryDigest>,
    timestamp: &Timestamp,
) -> EntryDigest {
    let mut hasher = StreamingHasher::new();
    hasher.update(&index.to_be_bytes());
    hasher.update(&(content.len() as u64).to_be_bytes());
    hasher.update(content);
    match prev_digest {
        Some(prev) => {
            hasher.update(&[1u8]);
            hasher.update(prev.as_bytes());
        }
        None => hasher.update(&[0u8]),
    }
    hasher.update(&timestamp.timestamp().to_be_bytes());
    hasher.update(&timestamp.timestamp_subsec_nanos().to_be_bytes());
    hasher.finalize()
}

mod content_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
