//! HS256 token signing and verification.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use sentinel_core::config::AuthConfig;
use sentinel_core::error::AppError;

use super::claims::{TokenClaims, TokenType};
use crate::clock::Clock;
use crate::error::{AuthError, TokenError};

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded token handed to the client.
    pub token: String,
    /// Claims signed into `token`.
    pub claims: TokenClaims,
}

/// Creates and verifies signed tokens with a shared secret.
///
/// Verification is a pure function of the token, the secret, and the
/// clock; it never consults the revocation store.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
    /// Seconds past `exp` during which a token is still accepted.
    leeway: i64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &Algorithm::HS256)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl TokenSigner {
    /// Creates a signer from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock in `check_expiry`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
            leeway: i64::try_from(config.leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Signs a new token for `subject` valid for `ttl` from now.
    pub fn issue(
        &self,
        subject: Uuid,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| AppError::internal("Token lifetime is out of range"))?;
        if ttl_secs <= 0 {
            return Err(AppError::internal("Token lifetime must be at least one second").into());
        }

        let iat = self.clock.now().timestamp();
        let claims = TokenClaims {
            sub: subject,
            token_type,
            iat,
            exp: iat + ttl_secs,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode {token_type} token: {e}")))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verifies signature, shape, expiry, and type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, TokenError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// Verifies signature, shape, and expiry without a type check.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?
            .claims;

        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed);
        }
        self.check_expiry(&claims)?;
        Ok(claims)
    }

    /// Time until `claims` stop being accepted, including leeway.
    ///
    /// Revocation entries are written with this TTL so an entry never
    /// expires while the token could still verify.
    pub fn remaining_lifetime(&self, claims: &TokenClaims) -> Duration {
        let remaining = claims
            .exp
            .saturating_add(self.leeway)
            .saturating_sub(self.clock.now().timestamp());
        Duration::from_secs(u64::try_from(remaining).unwrap_or(0))
    }

    fn check_expiry(&self, claims: &TokenClaims) -> Result<(), TokenError> {
        if self.clock.now().timestamp() >= claims.exp.saturating_add(self.leeway) {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}
