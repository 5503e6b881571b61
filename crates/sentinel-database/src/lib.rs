//! # sentinel-database
//!
//! User directory backends: PostgreSQL through sqlx for deployments and a
//! concurrent in-memory map for development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryUserDirectory;
pub use repositories::user::PgUserDirectory;
