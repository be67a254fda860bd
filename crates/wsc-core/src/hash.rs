//! Content-addressed hashing for repositories and plans.
//!
//! Hashes cover the canonical JSON serialization of a value, so two
//! repositories with the same services in the same order share a digest.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// SHA-256 over the JSON serialization of `value`.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<ContentHash, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Sha256::digest(&json).into())
}

/// Lower-case hex form of a content hash.
pub fn hash_hex(hash: &ContentHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Hex digest of `value`, as printed in reports.
pub fn digest<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    content_hash(value).map(|h| hash_hex(&h))
}
