//! Redis revocation store implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use sentinel_core::error::{AppError, ErrorKind};
use sentinel_core::result::AppResult;
use sentinel_core::traits::revocation::RevocationStore;

use super::client::RedisClient;
use crate::keys;

/// Redis-backed revocation store.
///
/// Each entry is a single key written with `SET .. PX`, so expiry and
/// visibility are atomic per token across every process sharing the
/// instance.
#[derive(Debug, Clone)]
pub struct RedisRevocationStore {
    client: RedisClient,
    /// Upper bound for one round trip.
    timeout: Duration,
}

impl RedisRevocationStore {
    /// Create a new store over a connected client.
    pub fn new(client: RedisClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }

    /// Run one command, turning a slow store into an error instead of a hang.
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(Self::map_err),
            Err(_) => Err(AppError::service_unavailable(format!(
                "Redis {op} timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

/// Redis rejects `PX 0`; sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

/// `SET key marked_at PX ttl [NX]`
fn set_marker_cmd(key: &str, marked_at: &str, ttl: Duration, only_if_absent: bool) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(marked_at).arg("PX").arg(ttl_millis(ttl));
    if only_if_absent {
        cmd.arg("NX");
    }
    cmd
}

/// `SET .. NX` replies `OK` when it wrote and nil when the key existed.
fn created(reply: Option<String>) -> bool {
    matches!(reply.as_deref(), Some("OK"))
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token: &str, ttl: Duration) -> AppResult<()> {
        let key = self.client.prefixed_key(&keys::revocation_key(token));
        let mut conn = self.client.conn_mut();

        if ttl.is_zero() {
            let _: () = self
                .bounded("DEL", redis::cmd("DEL").arg(&key).query_async(&mut conn))
                .await?;
            return Ok(());
        }

        let marked_at = Utc::now().to_rfc3339();
        let _: () = self
            .bounded(
                "SET",
                set_marker_cmd(&key, &marked_at, ttl, false).query_async(&mut conn),
            )
            .await?;

        debug!(ttl_ms = ttl_millis(ttl), "Revocation entry written");
        Ok(())
    }

    async fn revoke_once(&self, token: &str, ttl: Duration) -> AppResult<bool> {
        if ttl.is_zero() {
            return Ok(false);
        }

        let key = self.client.prefixed_key(&keys::revocation_key(token));
        let mut conn = self.client.conn_mut();
        let marked_at = Utc::now().to_rfc3339();

        let reply: Option<String> = self
            .bounded(
                "SET NX",
                set_marker_cmd(&key, &marked_at, ttl, true).query_async(&mut conn),
            )
            .await?;

        Ok(created(reply))
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        let key = self.client.prefixed_key(&keys::revocation_key(token));
        let mut conn = self.client.conn_mut();
        self.bounded("EXISTS", redis::cmd("EXISTS").arg(&key).query_async(&mut conn))
            .await
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = self
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(pong == "PONG")
    }
}
