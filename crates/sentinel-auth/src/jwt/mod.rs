//! Signed token issuance and verification.

pub mod claims;
pub mod signer;

pub use claims::{TokenClaims, TokenType};
pub use signer::{IssuedToken, TokenSigner};
