//! Stable hashing for content-addressed cache keys

use sha2::{Digest, Sha256};

/// First 16 hex chars of SHA-256 over `path` and `content`.
pub fn stable_hash(path: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hasher.update(b"\n");
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}
