//! Revocation store trait for pluggable backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A shared set of revoked tokens with per-entry expiry.
///
/// Entries are keyed by the raw token string; implementations decide how
/// the key is derived but must map equal tokens to equal keys. An `Err`
/// means the store could not answer and must never be read as
/// "not revoked".
#[async_trait]
pub trait RevocationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Mark `token` revoked for `ttl`, replacing the expiry of any existing
    /// entry. A zero `ttl` removes the entry.
    async fn revoke(&self, token: &str, ttl: Duration) -> AppResult<()>;

    /// Mark `token` revoked only if no entry exists yet.
    ///
    /// Returns `true` if this call created the entry. Exactly one of any
    /// number of concurrent callers observes `true`. A zero `ttl` creates
    /// nothing and returns `false`.
    async fn revoke_once(&self, token: &str, ttl: Duration) -> AppResult<bool>;

    /// Whether an unexpired entry exists for `token`.
    async fn is_revoked(&self, token: &str) -> AppResult<bool>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
