//! # sentinel-auth
//!
//! Token lifecycle and revocation for Sentinel.
//!
//! ## Modules
//!
//! - `clock`: time source used for every expiry computation
//! - `jwt`: signed token issuance and verification
//! - `password`: Argon2id credential verification
//! - `guard`: per-request gate: signature, revocation, then directory lookup
//! - `session`: login, refresh, and logout orchestration
//! - `error`: token and auth failure taxonomy

pub mod clock;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, TokenError};
pub use guard::{AuthGuard, AuthenticatedUser};
pub use jwt::{IssuedToken, TokenClaims, TokenSigner, TokenType};
pub use password::PasswordHasher;
pub use session::{AuthSessionService, TokenPair};
