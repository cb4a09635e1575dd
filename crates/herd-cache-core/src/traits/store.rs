//! Cache store port

use crate::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// The key/value operations the caching layer needs from an external store.
///
/// Values are text; binary payloads must be pre-encoded by the codec. All
/// operations are atomic at single-key granularity, which is the only
/// atomicity the loading strategies rely on. No multi-key transactions are
/// required. Implementations include an in-memory store and Redis.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Get the value stored under `key`
    ///
    /// Returns `None` if the key doesn't exist or its TTL has lapsed.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Set `key` to `value`, with an optional store-level TTL
    ///
    /// `ttl: None` stores the value without expiry; the logical-expiry
    /// strategy depends on this to keep its envelopes out of the store's
    /// eviction path.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Set `key` to `value` with a TTL only if the key does not exist
    ///
    /// Atomic test-and-set; returns `true` only when this call created the
    /// key. The rebuild lock is built entirely on this operation.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError>;

    /// Delete a key
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Set or replace the TTL of an existing key
    ///
    /// Returns `false` if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;
}
