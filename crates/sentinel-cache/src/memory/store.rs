//! In-memory revocation store using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::future::Cache;
use tracing::warn;

use sentinel_core::config::MemoryStoreConfig;
use sentinel_core::error::AppError;
use sentinel_core::result::AppResult;
use sentinel_core::traits::revocation::RevocationStore;

use crate::keys;

/// A revocation marker with its own expiry.
#[derive(Debug, Clone)]
struct Marker {
    marked_at: DateTime<Utc>,
    ttl: Duration,
}

impl Marker {
    fn new(ttl: Duration) -> Self {
        Self {
            marked_at: Utc::now(),
            ttl,
        }
    }
}

/// Per-entry expiry: every write resets the entry's lifetime to the marker's TTL.
struct MarkerExpiry;

impl Expiry<String, Marker> for MarkerExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Marker,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Marker,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local revocation store.
///
/// Only correct for a single instance: revocations are invisible to other
/// processes. The moka cache is never size-bounded, so an entry leaves only
/// when its TTL elapses or a zero-TTL revoke removes it.
#[derive(Debug, Clone)]
pub struct MemoryRevocationStore {
    cache: Cache<String, Marker>,
    /// Refuse new keys once this many entries are live.
    capacity: Option<u64>,
}

impl MemoryRevocationStore {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        let cache = Cache::builder().expire_after(MarkerExpiry).build();

        Self {
            cache,
            capacity: config.max_capacity,
        }
    }

    /// When `token` was revoked, if its entry is still live.
    pub async fn revoked_at(&self, token: &str) -> Option<DateTime<Utc>> {
        self.cache
            .get(&keys::revocation_key(token))
            .await
            .map(|m| m.marked_at)
    }

    /// Number of live entries, after applying pending evictions.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Fails if `key` is new and the configured limit is reached.
    ///
    /// The limit is soft under concurrent writers: a few racing inserts may
    /// land past it, but no live entry is ever dropped to make room.
    async fn ensure_room(&self, key: &str) -> AppResult<()> {
        let Some(capacity) = self.capacity else {
            return Ok(());
        };
        if self.cache.contains_key(key) {
            return Ok(());
        }
        if self.entry_count().await >= capacity {
            warn!(capacity, "In-memory revocation store is full");
            return Err(AppError::service_unavailable(
                "In-memory revocation store is full",
            ));
        }
        Ok(())
    }
}

impl Default for MemoryRevocationStore {
    fn default() -> Self {
        Self::new(&MemoryStoreConfig::default())
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token: &str, ttl: Duration) -> AppResult<()> {
        let key = keys::revocation_key(token);
        if ttl.is_zero() {
            self.cache.invalidate(&key).await;
            return Ok(());
        }
        self.ensure_room(&key).await?;
        self.cache.insert(key, Marker::new(ttl)).await;
        Ok(())
    }

    async fn revoke_once(&self, token: &str, ttl: Duration) -> AppResult<bool> {
        if ttl.is_zero() {
            return Ok(false);
        }
        let key = keys::revocation_key(token);
        self.ensure_room(&key).await?;
        let entry = self.cache.entry(key).or_insert(Marker::new(ttl)).await;
        Ok(entry.is_fresh())
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        Ok(self.cache.get(&keys::revocation_key(token)).await.is_some())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
