//! # sentinel-entity
//!
//! Domain entity models for Sentinel. Database entities derive
//! `sqlx::FromRow` alongside the usual serde traits.

pub mod user;
