//! # sentinel-core
//!
//! Core crate for Sentinel. Contains the configuration schemas, the
//! unified error system, and the traits that the storage and credential
//! backends implement.
//!
//! This crate has **no** internal dependencies on other Sentinel crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
