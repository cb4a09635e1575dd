//! In-memory cache store using DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

use herd_cache_core::{CacheError, CacheStore};

/// A stored value with its optional expiry instant
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|t| Instant::now() + t),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Operation counters for the memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    /// Number of reads that found a live key
    pub hits: u64,
    /// Number of reads that found nothing (or an expired key)
    pub misses: u64,
    /// Number of write operations (including `set_nx` wins)
    pub writes: u64,
    /// Number of delete operations that removed a live key
    pub deletes: u64,
}

/// In-memory cache store
///
/// Expiry is lazy: an expired key is dropped the first time a read or
/// conditional write touches it, mirroring how a remote store would have
/// already evicted it. Cloning creates a new handle to the SAME underlying
/// store, so clones can be handed to concurrent tasks in tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<DashMap<String, StoredValue>>,
    stats: Arc<RwLock<MemoryStats>>,
}

impl MemoryStore {
    /// Create a new, empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> MemoryStats {
        self.stats.read().clone()
    }

    /// Number of keys currently held, including not-yet-collected expired ones
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop every key
    pub fn clear(&self) {
        self.data.clear();
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(entry) = self.data.get(key) {
            if !entry.is_expired() {
                let value = entry.value.clone();
                drop(entry);
                self.stats.write().hits += 1;
                return Ok(Some(value));
            }
            drop(entry);
            self.data.remove_if(key, |_, v| v.is_expired());
        }
        self.stats.write().misses += 1;
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.data
            .insert(key.to_string(), StoredValue::new(value, ttl));
        self.stats.write().writes += 1;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, CacheError> {
        // The entry lock makes the test-and-set atomic; an expired entry
        // counts as absent.
        let created = match self.data.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(mut o) => {
                if o.get().is_expired() {
                    o.insert(StoredValue::new(value, Some(ttl)));
                    true
                } else {
                    false
                }
            }
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert(StoredValue::new(value, Some(ttl)));
                true
            }
        };
        if created {
            self.stats.write().writes += 1;
        }
        Ok(created)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed_live = self
            .data
            .remove(key)
            .is_some_and(|(_, v)| !v.is_expired());
        if removed_live {
            self.stats.write().deletes += 1;
        }
        Ok(removed_live)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        match self.data.get_mut(key) {
            Some(mut entry) if !entry.is_expired() => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
