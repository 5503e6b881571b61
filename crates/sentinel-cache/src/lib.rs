//! # sentinel-cache
//!
//! Revocation store implementations for Sentinel. Supports two modes:
//!
//! - **redis**: shared store using the [redis](https://crates.io/crates/redis) crate
//! - **memory**: in-process store using [moka](https://crates.io/crates/moka)
//!
//! The backend is selected at startup from configuration and handed to the
//! auth subsystem as an `Arc<dyn RevocationStore>`.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::RevocationStoreManager;
