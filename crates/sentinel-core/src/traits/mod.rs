//! Core traits defined in `sentinel-core` and implemented by other crates.

pub mod credential;
pub mod revocation;

pub use credential::CredentialVerifier;
pub use revocation::RevocationStore;
