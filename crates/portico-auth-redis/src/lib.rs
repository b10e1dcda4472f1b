//! # portico-auth-redis
//!
//! Redis-backed [`RevocationStore`] for the Portico gateway.
//!
//! Revocation records are plain keys with a native Redis expiry:
//!
//! ```text
//! SET jwt_blacklist:{jti} "true" EX {remaining_validity_secs}
//! ```
//!
//! The store never needs a cleanup pass; Redis drops each key when the
//! credential it shadows would have expired anyway. Single-key commands are
//! atomic by construction, which is all the concurrency the revoke/check pair
//! requires.
//!
//! Every command runs under a bounded timeout. A slow or unreachable Redis
//! yields a store error promptly, which the admission layer converts into a
//! fail-closed rejection instead of hanging the request.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, Runtime};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use portico_auth::{AuthError, AuthResult, RevocationStore};

/// Revocation store connection settings, shared by every binary that talks
/// to the store (the gateway checks records, the user service writes them).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Enable the Redis-backed store. When disabled a binary falls back to an
    /// in-process store, which only upholds logout guarantees for a single
    /// instance.
    #[serde(default)]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379").
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size.
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Per-command timeout in milliseconds.
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".into()
}
fn default_redis_pool_size() -> usize {
    16
}
fn default_redis_timeout_ms() -> u64 {
    2_000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

impl RedisConfig {
    /// Per-command timeout as a `Duration`.
    #[must_use]
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled {
            if self.url.is_empty() {
                return Err("redis.enabled=true requires redis.url".into());
            }
            if self.pool_size == 0 {
                return Err("redis.pool_size must be > 0".into());
            }
        }
        Ok(())
    }
}

/// Key namespace shared with the original deployment's blacklist.
const KEY_PREFIX: &str = "jwt_blacklist:";

/// Opaque marker value; only key existence matters.
const REVOKED_MARKER: &str = "true";

fn revocation_key(jti: &str) -> String {
    format!("{KEY_PREFIX}{jti}")
}

/// Redis-backed revocation store.
pub struct RedisRevocationStore {
    pool: Pool,
    op_timeout: Duration,
}

impl RedisRevocationStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: Pool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    /// Connects using [`RedisConfig`] settings.
    ///
    /// # Errors
    /// Returns a store error if the pool cannot be built or Redis does not
    /// answer.
    pub async fn from_config(cfg: &RedisConfig) -> AuthResult<Self> {
        Self::connect(&cfg.url, cfg.pool_size, cfg.op_timeout()).await
    }

    /// Builds a pool from a Redis URL and verifies the connection with a PING,
    /// so a misconfigured store fails at startup rather than on the first
    /// admission check.
    ///
    /// # Errors
    /// Returns a store error if the pool cannot be built or Redis does not
    /// answer.
    pub async fn connect(
        url: &str,
        pool_size: usize,
        op_timeout: Duration,
    ) -> AuthResult<Self> {
        let mut cfg = deadpool_redis::Config::from_url(url);
        let mut pool_cfg = cfg.pool.unwrap_or_default();
        pool_cfg.max_size = pool_size;
        pool_cfg.timeouts.wait = Some(op_timeout);
        pool_cfg.timeouts.create = Some(op_timeout);
        pool_cfg.timeouts.recycle = Some(op_timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| AuthError::store(format!("failed to create redis pool: {e}")))?;

        let store = Self::new(pool, op_timeout);
        let mut conn = store.conn().await?;
        store
            .bounded(redis::cmd("PING").query_async::<()>(&mut conn))
            .await?;
        tracing::info!(url = %url, "connected to redis revocation store");

        Ok(store)
    }

    async fn conn(&self) -> AuthResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| AuthError::store(format!("failed to acquire redis connection: {e}")))
    }

    /// Runs a Redis command under the configured timeout.
    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = redis::RedisResult<T>>,
    ) -> AuthResult<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AuthError::store(format!("redis command failed: {e}"))),
            Err(_) => Err(AuthError::store(format!(
                "redis command timed out after {:?}",
                self.op_timeout
            ))),
        }
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, jti: &str, ttl: Duration) -> AuthResult<()> {
        if ttl.is_zero() {
            // Credential already expired; nothing to protect.
            return Ok(());
        }
        // SET .. EX refuses a zero expiry; sub-second remainders round up.
        let secs = ttl.as_secs().max(1);

        let mut conn = self.conn().await?;
        self.bounded(conn.set_ex::<_, _, ()>(revocation_key(jti), REVOKED_MARKER, secs))
            .await?;
        tracing::debug!(jti = %jti, ttl_secs = secs, "revocation record written");
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AuthResult<bool> {
        let mut conn = self.conn().await?;
        self.bounded(conn.exists::<_, bool>(revocation_key(jti)))
            .await
    }
}
