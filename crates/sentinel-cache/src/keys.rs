//! Key builders for revocation entries.
//!
//! Every backend derives keys through this module so a token revoked by
//! one process is found by every other process sharing the store.

use sha2::{Digest, Sha256};

/// Store key for a raw token.
///
/// The token is hashed so the credential itself never sits in the store;
/// equal tokens always map to equal keys.
pub fn revocation_key(token: &str) -> String {
    format!("revoked:{}", token_digest(token))
}

/// Hex-encoded SHA-256 of the raw token.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
