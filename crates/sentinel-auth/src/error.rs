//! Token and authentication failures.
//!
//! Internally every failure keeps its precise cause. The conversion into
//! [`AppError`] decides what a caller is allowed to see: all token
//! validation failures collapse into one message, while revocation is
//! reported explicitly.

use thiserror::Error;

use sentinel_core::error::{AppError, ErrorKind};

use crate::jwt::TokenType;

/// Why a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a well-formed token, or its claims do not have the expected shape.
    #[error("token is malformed")]
    Malformed,
    /// Signed with a different secret or algorithm, or tampered with.
    #[error("token signature is invalid")]
    BadSignature,
    /// Past its `exp` claim.
    #[error("token has expired")]
    Expired,
    /// Structurally valid, but an access token was presented where a refresh
    /// token is required or vice versa.
    #[error("expected {expected} token, got {actual}")]
    WrongTokenType {
        /// Type the caller required.
        expected: TokenType,
        /// Type carried by the token.
        actual: TokenType,
    },
    /// Valid, but issued to a different user than the one presenting it.
    #[error("token belongs to a different subject")]
    SubjectMismatch,
}

/// Failure of a guard check or a session operation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The presented access token did not verify.
    #[error("could not validate credentials")]
    Unauthorized(#[source] TokenError),
    /// The presented refresh token did not verify.
    #[error("invalid refresh token")]
    InvalidToken(#[source] TokenError),
    /// The token verified but was explicitly revoked.
    #[error("token has been revoked")]
    Revoked,
    /// Unknown email or wrong password; the two are indistinguishable.
    #[error("incorrect email or password")]
    InvalidCredentials,
    /// The account exists but is deactivated.
    #[error("inactive user")]
    InactiveUser,
    /// The token's subject no longer resolves to a user.
    #[error("user not found")]
    UserNotFound,
    /// No bearer token was presented.
    #[error("not authenticated")]
    MissingToken,
    /// The revocation store could not answer.
    #[error("revocation store unavailable")]
    StoreUnavailable(#[source] AppError),
    /// Directory, hashing, or signing failure.
    #[error(transparent)]
    Internal(#[from] AppError),
}

impl AuthError {
    /// The token-level cause, for verification failures.
    pub fn token_error(&self) -> Option<TokenError> {
        match self {
            Self::Unauthorized(e) | Self::InvalidToken(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized(_) | AuthError::InvalidToken(_) => {
                AppError::unauthorized("Could not validate credentials")
            }
            AuthError::Revoked => AppError::unauthorized("Token has been revoked"),
            AuthError::InvalidCredentials => AppError::unauthorized("Incorrect email or password"),
            AuthError::InactiveUser => AppError::forbidden("Inactive user"),
            AuthError::UserNotFound => AppError::not_found("User not found"),
            AuthError::MissingToken => AppError::unauthorized("Not authenticated"),
            AuthError::StoreUnavailable(source) => AppError::with_source(
                ErrorKind::ServiceUnavailable,
                "Authentication temporarily unavailable",
                source,
            ),
            AuthError::Internal(inner) => inner,
        }
    }
}
