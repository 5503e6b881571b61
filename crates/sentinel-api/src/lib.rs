//! # sentinel-api
//!
//! HTTP API layer for Sentinel built on Axum.
//!
//! Provides the auth and profile endpoints, health reporting, the bearer
//! token extractor, request logging, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
