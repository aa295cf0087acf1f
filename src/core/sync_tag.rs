//! Platform-prefixed sync tags
//!
//! A sync tag is a short `platform:<16 hex>` label used by replicas to compare
//! state records without exchanging them. Records are hashed as canonical JSON
//! (object keys sorted, no insignificant whitespace).

use crate::core::hash::hash_bytes;
use serde_json::Value;

/// Number of hex characters kept from the record digest
pub const SYNC_TAG_HEX_LEN: usize = 16;

/// Render a JSON value in canonical form
pub fn canonical_json(value: &Value) -> String {
    // serde_json::Map is ordered by key unless `preserve_order` is enabled
    value.to_string()
}

/// Build the sync tag for a record on a platform
pub fn sync_tag(value: &Value, platform: &str) -> String {
    let digest = hash_bytes(canonical_json(value).as_bytes()).to_hex();
    format!("{}:{}", platform, &digest[..SYNC_TAG_HEX_LEN])
}

/// Check a record against a previously issued sync tag
pub fn verify_sync_tag(value: &Value, expected: &str) -> bool {
    match expected.split_once(':') {
        Some((platform, _)) => sync_tag(value, platform) == expected,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"b":1,"a":2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":2,"b":1}"#).unwrap();
        assert_eq!(sync_tag(&a, "github"), sync_tag(&b, "github"));
    }

    #[test]
    fn test_tag_shape() {
        let tag = sync_tag(&json!({"card": "CARD-001"}), "salesforce");
        let (platform, digest) = tag.split_once(':').unwrap();
        assert_eq!(platform, "salesforce");
        assert_eq!(digest.len(), SYNC_TAG_HEX_LEN);
    }

    #[test]
    fn test_verify() {
        let record = json!({"status": "open"});
        let tag = sync_tag(&record, "github");
        assert!(verify_sync_tag(&record, &tag));
        assert!(!verify_sync_tag(&json!({"status": "merged"}), &tag));
        assert!(!verify_sync_tag(&record, "no-separator"));
    }
}
