//! Per-request authorization gate.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use sentinel_core::config::FailurePolicy;
use sentinel_core::traits::revocation::RevocationStore;
use sentinel_entity::user::{User, UserDirectory};

use crate::error::AuthError;
use crate::jwt::{TokenClaims, TokenSigner, TokenType};

/// A request principal that passed every guard check.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Freshly resolved user record.
    pub user: User,
    /// Verified access token claims.
    pub claims: TokenClaims,
    /// The raw access token as presented.
    pub token: String,
}

impl AuthenticatedUser {
    /// The authenticated user's ID.
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Validates access tokens against signature, revocation list and directory.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    signer: Arc<TokenSigner>,
    store: Arc<dyn RevocationStore>,
    directory: Arc<dyn UserDirectory>,
    policy: FailurePolicy,
}

impl AuthGuard {
    /// Creates a guard over the given collaborators.
    pub fn new(
        signer: Arc<TokenSigner>,
        store: Arc<dyn RevocationStore>,
        directory: Arc<dyn UserDirectory>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            signer,
            store,
            directory,
            policy,
        }
    }

    /// Policy applied when the revocation store cannot answer.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Full check: signature and type, then revocation, then user lookup.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.verify_access(token)?;

        if self.check_revoked(token).await? {
            debug!(user_id = %claims.sub, "Rejected revoked access token");
            return Err(AuthError::Revoked);
        }

        let user = self.resolve_active_user(claims.sub).await?;
        Ok(AuthenticatedUser {
            user,
            claims,
            token: token.to_string(),
        })
    }

    /// Like [`authenticate`](Self::authenticate) but accepts an already
    /// revoked token. Logout uses this so a repeated logout succeeds.
    pub async fn revalidate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.verify_access(token)?;
        let user = self.resolve_active_user(claims.sub).await?;
        Ok(AuthenticatedUser {
            user,
            claims,
            token: token.to_string(),
        })
    }

    /// Looks up `id` and requires the account to be active.
    pub async fn resolve_active_user(&self, id: Uuid) -> Result<User, AuthError> {
        let user = self
            .directory
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            debug!(user_id = %id, "Rejected token for inactive user");
            return Err(AuthError::InactiveUser);
        }
        Ok(user)
    }

    fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.signer
            .verify(token, TokenType::Access)
            .map_err(|cause| {
                debug!(error = %cause, "Access token rejected");
                AuthError::Unauthorized(cause)
            })
    }

    async fn check_revoked(&self, token: &str) -> Result<bool, AuthError> {
        match self.store.is_revoked(token).await {
            Ok(revoked) => Ok(revoked),
            Err(e) => match self.policy {
                FailurePolicy::FailClosed => {
                    warn!(error = %e, "Revocation store unavailable, rejecting request");
                    Err(AuthError::StoreUnavailable(e))
                }
                FailurePolicy::FailOpen => {
                    warn!(
                        error = %e,
                        "Revocation store unavailable, treating token as not revoked"
                    );
                    Ok(false)
                }
            },
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingToken)?.trim();
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MissingToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
