//! Revocation store configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Backend that holds revocation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreProvider {
    /// Shared Redis instance; required when more than one process serves traffic.
    Redis,
    /// Process-local store; only valid for a single instance.
    Memory,
}

/// What the auth guard does when the revocation store cannot be reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Reject the request.
    #[default]
    FailClosed,
    /// Log a warning and treat the token as not revoked.
    FailOpen,
}

/// Top-level revocation store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationConfig {
    /// Store backend.
    #[serde(default = "default_provider")]
    pub provider: StoreProvider,
    /// Guard behaviour on store outage.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Upper bound for a single store round trip, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Redis backend settings.
    #[serde(default)]
    pub redis: RedisStoreConfig,
    /// In-memory backend settings.
    #[serde(default)]
    pub memory: MemoryStoreConfig,
}

impl RevocationConfig {
    /// Store round-trip timeout.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), AppError> {
        if self.timeout_ms == 0 {
            return Err(AppError::configuration(
                "revocation.timeout_ms must be greater than zero",
            ));
        }
        if self.memory.max_capacity == Some(0) {
            return Err(AppError::configuration(
                "revocation.memory.max_capacity must be greater than zero when set",
            ));
        }
        Ok(())
    }
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            failure_policy: FailurePolicy::default(),
            timeout_ms: default_timeout_ms(),
            redis: RedisStoreConfig::default(),
            memory: MemoryStoreConfig::default(),
        }
    }
}

/// Redis backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all Sentinel keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// In-memory backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Optional limit on live revocation entries. Unset means entries are
    /// bounded only by their TTLs. When the limit is reached, new
    /// revocations fail instead of displacing existing ones.
    #[serde(default)]
    pub max_capacity: Option<u64>,
}

fn default_provider() -> StoreProvider {
    StoreProvider::Redis
}

fn default_timeout_ms() -> u64 {
    500
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "sentinel:".to_string()
}
