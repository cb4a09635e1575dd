use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

use herd_cache_core::{CacheError, CacheStore};

use super::config::RedisConfig;

/// Redis-backed cache store
///
/// TTLs are applied with millisecond precision (PX/PSETEX/PEXPIRE). The
/// conditional write is a single `SET NX PX`, so lock acquisition and its
/// liveness TTL are one atomic round-trip.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool<RedisConnectionManager>,
    config: RedisConfig,
}

impl RedisStore {
    /// Create a new Redis store
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self { pool, config })
    }

    /// Apply the configured prefix to a key
    fn prefixed_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Get connection from pool
    async fn get_connection(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.get_connection().await?;
        let prefixed = self.prefixed_key(key);

        conn.get(&prefixed)
            .await
            .map_err(|e| CacheError::Store(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.get_connection().await?;
        let prefixed = self.prefixed_key(key);

        match ttl {
            Some(ttl) => conn
                .pset_ex::<_, _, ()>(&prefixed, value, ttl.as_millis() as u64)
                .await
                .map_err(|e| CacheError::Store(e.to_string())),
            None => conn
                .set::<_, _, ()>(&prefixed, value)
                .await
                .map_err(|e| CacheError::Store(e.to_string())),
        }
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut conn = self.get_connection().await?;
        let prefixed = self.prefixed_key(key);

        // SET key value NX PX ms: replies OK when the key was created,
        // nil when it already existed.
        let reply: Option<String> = redis::cmd("SET")
            .arg(&prefixed)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Store(e.to_string()))?;

        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.get_connection().await?;
        let prefixed = self.prefixed_key(key);

        let deleted: i64 = conn
            .del(&prefixed)
            .await
            .map_err(|e| CacheError::Store(e.to_string()))?;

        Ok(deleted > 0)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut conn = self.get_connection().await?;
        let prefixed = self.prefixed_key(key);

        conn.pexpire(&prefixed, ttl.as_millis() as i64)
            .await
            .map_err(|e| CacheError::Store(e.to_string()))
    }
}
