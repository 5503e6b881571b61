//! Revocation store manager that dispatches to the configured backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use sentinel_core::config::{RevocationConfig, StoreProvider};
use sentinel_core::error::AppError;
use sentinel_core::result::AppResult;
use sentinel_core::traits::revocation::RevocationStore;

/// Owns the revocation store handle for the lifetime of the process.
///
/// Constructed once by the entry point with [`connect`](Self::connect) and
/// shut down with [`close`](Self::close); the auth subsystem only sees the
/// `Arc<dyn RevocationStore>` returned by [`store`](Self::store).
#[derive(Debug, Clone)]
pub struct RevocationStoreManager {
    inner: Arc<dyn RevocationStore>,
    provider: &'static str,
}

impl RevocationStoreManager {
    /// Connect to the backend named in configuration.
    pub async fn connect(config: &RevocationConfig) -> AppResult<Self> {
        match config.provider {
            #[cfg(feature = "redis-backend")]
            StoreProvider::Redis => {
                info!("Initializing Redis revocation store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                let store = crate::redis::RedisRevocationStore::new(client, config.timeout());
                Ok(Self {
                    inner: Arc::new(store),
                    provider: "redis",
                })
            }
            #[cfg(feature = "memory")]
            StoreProvider::Memory => {
                info!("Initializing in-memory revocation store (single instance only)");
                let store = crate::memory::MemoryRevocationStore::new(&config.memory);
                Ok(Self {
                    inner: Arc::new(store),
                    provider: "memory",
                })
            }
            #[allow(unreachable_patterns)]
            other => Err(AppError::configuration(format!(
                "Revocation store provider {other:?} is not compiled in"
            ))),
        }
    }

    /// Shared handle to inject into the auth subsystem.
    pub fn store(&self) -> Arc<dyn RevocationStore> {
        Arc::clone(&self.inner)
    }

    /// Name of the active backend.
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Release the backend. Connections close once the last handle is dropped.
    pub async fn close(self) {
        let handles = Arc::strong_count(&self.inner);
        drop(self.inner);
        info!(
            provider = self.provider,
            outstanding_handles = handles - 1,
            "Revocation store closed"
        );
    }
}

#[async_trait]
impl RevocationStore for RevocationStoreManager {
    async fn revoke(&self, token: &str, ttl: Duration) -> AppResult<()> {
        self.inner.revoke(token, ttl).await
    }

    async fn revoke_once(&self, token: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.revoke_once(token, ttl).await
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        self.inner.is_revoked(token).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
