//! Shared SHA-256 hex digest utility.
//!
//! Document content hashes are computed here so that the write path and
//! the diff engine agree on one digest for one content string.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compute the content hash stored on a document version row.
pub fn content_hash(content: &str) -> String {
    sha256_hex(content.as_bytes())
}
