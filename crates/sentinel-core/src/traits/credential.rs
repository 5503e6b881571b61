//! Password hashing capability consumed by the login flow.

use crate::result::AppResult;

/// Hashes and verifies plaintext passwords.
///
/// Implementations must be constant-time with respect to the digest
/// comparison. A mismatch is `Ok(false)`, never an error.
pub trait CredentialVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Produce a self-describing digest for `password`.
    fn hash(&self, password: &str) -> AppResult<String>;

    /// Check `password` against a digest previously produced by [`hash`](Self::hash).
    fn verify(&self, password: &str, digest: &str) -> AppResult<bool>;
}
