//! Distributed rebuild lock

use std::sync::Arc;
use std::time::Duration;

use herd_cache_core::{CacheStore, Result};

/// Prefix keeping the lock key-space disjoint from data keys
const LOCK_PREFIX: &str = "lock:";

/// Short-lived mutual-exclusion token built on the store's `set_nx`.
///
/// The lock carries no holder identity: the store only tracks presence, so
/// any caller can release any key's lock. The TTL is a liveness backstop
/// against a crashed holder and is never renewed; a rebuild outliving it
/// loses mutual exclusion silently. Cloning shares the underlying store.
pub struct RebuildLock<B: CacheStore> {
    store: Arc<B>,
    ttl: Duration,
}

impl<B: CacheStore> RebuildLock<B> {
    /// Create a lock over `store` with the given liveness TTL
    pub fn new(store: Arc<B>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// The lock key guarding `key`
    pub fn lock_key(key: &str) -> String {
        format!("{LOCK_PREFIX}{key}")
    }

    /// Try to acquire the lock for `key`
    ///
    /// Returns `true` only when this call created the lock key.
    pub async fn try_lock(&self, key: &str) -> Result<bool> {
        self.store.set_nx(&Self::lock_key(key), "1", self.ttl).await
    }

    /// Release the lock for `key`, unconditionally
    pub async fn unlock(&self, key: &str) -> Result<bool> {
        self.store.delete(&Self::lock_key(key)).await
    }
}

impl<B: CacheStore> Clone for RebuildLock<B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ttl: self.ttl,
        }
    }
}
