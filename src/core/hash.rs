//! Digest primitive for Chainseal
//!
//! Every higher layer (chain, Merkle accumulator, folding) hashes through the
//! functions in this module and never names the underlying algorithm, so the
//! algorithm can be replaced here without touching callers.

use crate::core::types::Hash;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Compute the digest of data
pub fn hash_bytes(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash::from_bytes(hasher.finalize().into())
}

/// Compute the digest of a string
pub fn hash_string(s: &str) -> Hash {
    hash_bytes(s.as_bytes())
}

/// Compute the digest of two digests (Merkle parent nodes)
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = StreamingHasher::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hasher.finalize()
}

/// Compute the digest of several byte slices as if concatenated
pub fn hash_chunks(chunks: &[&[u8]]) -> Hash {
    let mut hasher = StreamingHasher::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize()
}

/// Digest of the empty byte string, used as the empty Merkle root
pub fn empty_digest() -> Hash {
    hash_bytes(b"")
}

/// Compute the digest of a file
pub fn hash_file(path: &Path) -> io::Result<Hash> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = StreamingHasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Incremental hasher for preimages assembled from several fields
pub struct StreamingHasher {
    hasher: Sha256,
}

impl StreamingHasher {
    /// Create a new streaming hasher
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Update the hash with new data
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finalize the hash and return the result
    pub fn finalize(self) -> Hash {
        Hash::from_bytes(self.hasher.finalize().into())
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_known_vector() {
        // SHA-256("abc")
        assert_eq!(
            hash_bytes(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_digest() {
        assert_eq!(
            empty_digest().to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_pair() {
        let hash1 = hash_bytes(b"first");
        let hash2 = hash_bytes(b"second");
        let combined = hash_pair(&hash1, &hash2);

        assert_ne!(combined, hash1);
        assert_ne!(combined, hash2);
        assert_eq!(combined, hash_pair(&hash1, &hash2));

        // Order should matter
        assert_ne!(combined, hash_pair(&hash2, &hash1));
    }

    #[test]
    fn test_hash_chunks_matches_concatenation() {
        let chunks = vec![b"Hello, ".as_slice(), b"World!".as_slice()];
        assert_eq!(hash_chunks(&chunks), hash_bytes(b"Hello, World!"));
    }

    #[test]
    fn test_hash_file() -> io::Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        let test_data = b"Test file content for hashing";
        temp_file.write_all(test_data)?;
        temp_file.flush()?;

        assert_eq!(hash_file(temp_file.path())?, hash_bytes(test_data));
        Ok(())
    }
}
