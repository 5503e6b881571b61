//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sentinel_auth::{AuthGuard, AuthSessionService};
use sentinel_core::config::AppConfig;
use sentinel_core::traits::revocation::RevocationStore;
use sentinel_database::DatabasePool;
use sentinel_entity::user::UserDirectory;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Login, refresh, logout and registration flows
    pub sessions: Arc<AuthSessionService>,
    /// Per-request token gate
    pub guard: Arc<AuthGuard>,

    /// User directory (PostgreSQL or in-memory)
    pub directory: Arc<dyn UserDirectory>,
    /// Revocation store (Redis or in-memory)
    pub revocation_store: Arc<dyn RevocationStore>,
    /// PostgreSQL pool, absent when the in-memory directory is used
    pub db_pool: Option<DatabasePool>,
}
