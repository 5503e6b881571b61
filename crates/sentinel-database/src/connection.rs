//! PostgreSQL pool backing the user directory.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use sentinel_core::config::{DatabaseConfig, redact_url};
use sentinel_core::error::{AppError, ErrorKind};
use sentinel_core::result::AppResult;

/// Shared pool handle, owned by the entry point and closed on shutdown.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool and check that at least one connection can be made.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            "Connecting user directory to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| database_error("Failed to connect to database", e))?;

        Ok(Self { pool })
    }

    /// The sqlx pool, for repositories and migrations.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// `SELECT 1` round trip, reported by `/health`.
    pub async fn health_check(&self) -> AppResult<bool> {
        if self.pool.is_closed() {
            warn!("Health check on a closed database pool");
            return Ok(false);
        }
        let one: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Database health check failed", e))?;
        Ok(one == 1)
    }

    /// Wait for checked-out connections to return, then close them all.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("User directory pool closed");
    }
}

fn database_error(context: &str, e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("{context}: {e}"), e)
}
