//! Session lifecycle service: login, refresh, and logout flows.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sentinel_core::config::AuthConfig;
use sentinel_core::result::AppResult;
use sentinel_core::traits::credential::CredentialVerifier;
use sentinel_core::traits::revocation::RevocationStore;
use sentinel_entity::user::{CreateUser, User, UserDirectory};

use crate::error::{AuthError, TokenError};
use crate::guard::AuthGuard;
use crate::jwt::{IssuedToken, TokenClaims, TokenSigner, TokenType};

/// Password used to build the digest verified for unknown emails.
const TIMING_DUMMY_PASSWORD: &str = "sentinel-unknown-account";

/// Shortest TTL written when consuming a refresh token.
const MIN_CONSUME_TTL: Duration = Duration::from_secs(1);

/// Tokens returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenPair {
    fn new(access: IssuedToken, refresh_token: String, refresh_expires_at: DateTime<Utc>) -> Self {
        Self {
            access_expires_at: access.claims.expires_at(),
            access_token: access.token,
            refresh_token,
            token_type: "bearer".to_string(),
            refresh_expires_at,
        }
    }
}

/// Ties credential checks, token issuance and revocation into one session model.
#[derive(Clone)]
pub struct AuthSessionService {
    signer: Arc<TokenSigner>,
    store: Arc<dyn RevocationStore>,
    directory: Arc<dyn UserDirectory>,
    verifier: Arc<dyn CredentialVerifier>,
    guard: Arc<AuthGuard>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    rotate_refresh_tokens: bool,
    /// Verified against when the email is unknown.
    dummy_digest: String,
}

impl std::fmt::Debug for AuthSessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .finish()
    }
}

impl AuthSessionService {
    /// Creates the service. Hashes the timing dummy once up front.
    pub fn new(
        signer: Arc<TokenSigner>,
        store: Arc<dyn RevocationStore>,
        directory: Arc<dyn UserDirectory>,
        verifier: Arc<dyn CredentialVerifier>,
        guard: Arc<AuthGuard>,
        config: &AuthConfig,
    ) -> AppResult<Self> {
        let dummy_digest = verifier.hash(TIMING_DUMMY_PASSWORD)?;
        Ok(Self {
            signer,
            store,
            directory,
            verifier,
            guard,
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
            rotate_refresh_tokens: config.rotate_refresh_tokens,
            dummy_digest,
        })
    }

    /// Checks credentials and issues a fresh token pair.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let Some(user) = self.directory.find_by_email(email).await? else {
            // Same verification cost as for a real account.
            let _ = self.verifier.verify(password, &self.dummy_digest);
            debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verifier.verify(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Login rejected: inactive user");
            return Err(AuthError::InactiveUser);
        }

        let pair = self.issue_pair(&user)?;
        info!(user_id = %user.id, "Login successful");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// With rotation enabled the presented refresh token is consumed and a
    /// new one returned; a consumed token is `Revoked` from then on.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .signer
            .verify(refresh_token, TokenType::Refresh)
            .map_err(|cause| {
                debug!(error = %cause, "Refresh token rejected");
                AuthError::InvalidToken(cause)
            })?;

        let user = self.guard.resolve_active_user(claims.sub).await?;

        if self.rotate_refresh_tokens {
            // Sign first so a signing failure leaves the presented token usable.
            let pair = self.issue_pair(&user)?;
            let ttl = self.signer.remaining_lifetime(&claims).max(MIN_CONSUME_TTL);
            let consumed = self
                .store
                .revoke_once(refresh_token, ttl)
                .await
                .map_err(AuthError::StoreUnavailable)?;
            if !consumed {
                warn!(user_id = %user.id, "Refresh rejected: token already used or revoked");
                return Err(AuthError::Revoked);
            }

            info!(user_id = %user.id, "Refresh token rotated");
            return Ok(pair);
        }

        let revoked = self
            .store
            .is_revoked(refresh_token)
            .await
            .map_err(AuthError::StoreUnavailable)?;
        if revoked {
            warn!(user_id = %user.id, "Refresh rejected: token revoked");
            return Err(AuthError::Revoked);
        }

        let access = self
            .signer
            .issue(user.id, TokenType::Access, self.access_ttl)?;
        info!(user_id = %user.id, "Access token refreshed");
        Ok(TokenPair::new(
            access,
            refresh_token.to_string(),
            claims.expires_at(),
        ))
    }

    /// Revokes the presented access token and, if given, the session's
    /// refresh token. Repeating a logout succeeds.
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        let principal = self.guard.revalidate(access_token).await?;

        let refresh = match refresh_token {
            Some(token) => self.refresh_claims_for(token, &principal.claims)?.map(|c| (token, c)),
            None => None,
        };

        let ttl = self.signer.remaining_lifetime(&principal.claims);
        self.store
            .revoke(access_token, ttl)
            .await
            .map_err(AuthError::StoreUnavailable)?;

        if let Some((token, claims)) = &refresh {
            let ttl = self.signer.remaining_lifetime(claims);
            self.store
                .revoke(token, ttl)
                .await
                .map_err(AuthError::StoreUnavailable)?;
        }

        info!(
            user_id = %principal.id(),
            refresh_revoked = refresh.is_some(),
            "Logout successful"
        );
        Ok(())
    }

    /// Creates an active user with a hashed password.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> AppResult<User> {
        let digest = self.verifier.hash(password)?;
        let user = self
            .directory
            .create(CreateUser::new(email, digest, first_name, last_name))
            .await?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// The guard this service authenticates through.
    pub fn guard(&self) -> &Arc<AuthGuard> {
        &self.guard
    }

    fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let access = self
            .signer
            .issue(user.id, TokenType::Access, self.access_ttl)?;
        let refresh = self
            .signer
            .issue(user.id, TokenType::Refresh, self.refresh_ttl)?;
        let refresh_expires_at = refresh.claims.expires_at();
        Ok(TokenPair::new(access, refresh.token, refresh_expires_at))
    }

    /// Claims of a logout's refresh token, or `None` if it has already expired.
    fn refresh_claims_for(
        &self,
        token: &str,
        access: &TokenClaims,
    ) -> Result<Option<TokenClaims>, AuthError> {
        match self.signer.verify(token, TokenType::Refresh) {
            Ok(claims) if claims.sub == access.sub => Ok(Some(claims)),
            Ok(_) => Err(AuthError::InvalidToken(TokenError::SubjectMismatch)),
            Err(TokenError::Expired) => Ok(None),
            Err(cause) => Err(AuthError::InvalidToken(cause)),
        }
    }
}
