//! Configuration for CacheClient

use std::time::Duration;

/// What the logical-expiry strategy does when the key is not cached at all.
///
/// The strategy is designed for pre-warmed hot keys, so the historical
/// behavior is to report absence and let a warm-up write populate the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColdMissPolicy {
    /// Return `None` without consulting the loader (default)
    #[default]
    ReturnAbsent,
    /// Load synchronously and write the first envelope, blocking this caller
    LoadThrough,
}

/// Configuration for [`CacheClient`](crate::CacheClient)
#[derive(Debug, Clone)]
pub struct CacheClientConfig {
    /// Namespace prefix applied to every data and lock key
    pub namespace: Option<String>,
    /// TTL for cached absent markers; bounds how long a confirmed miss
    /// keeps absorbing lookups
    pub null_value_ttl: Duration,
    /// Rebuild lock TTL, the liveness backstop against a crashed holder
    pub lock_ttl: Duration,
    /// Backoff between lock attempts in the exclusive strategy
    pub lock_retry_interval: Duration,
    /// Lock attempts before the exclusive strategy gives up
    pub max_lock_retries: u32,
    /// Background rebuild worker count
    pub rebuild_workers: usize,
    /// Bounded depth of the rebuild job queue
    pub rebuild_queue_depth: usize,
    /// Cold-miss behavior of the logical-expiry strategy
    pub cold_miss: ColdMissPolicy,
}

impl Default for CacheClientConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            null_value_ttl: Duration::from_secs(120),
            lock_ttl: Duration::from_secs(10),
            lock_retry_interval: Duration::from_millis(50),
            max_lock_retries: 100,
            rebuild_workers: 10,
            rebuild_queue_depth: 64,
            cold_miss: ColdMissPolicy::ReturnAbsent,
        }
    }
}

impl CacheClientConfig {
    /// Create config with a namespace
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Set the absent-marker TTL
    pub fn null_value_ttl(mut self, ttl: Duration) -> Self {
        self.null_value_ttl = ttl;
        self
    }

    /// Set the rebuild lock TTL
    pub fn lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }

    /// Set the exclusive strategy's retry budget
    pub fn lock_retries(mut self, interval: Duration, max: u32) -> Self {
        self.lock_retry_interval = interval;
        self.max_lock_retries = max;
        self
    }

    /// Size the background rebuild pool
    pub fn rebuild_pool(mut self, workers: usize, queue_depth: usize) -> Self {
        self.rebuild_workers = workers;
        self.rebuild_queue_depth = queue_depth;
        self
    }

    /// Set the cold-miss behavior of the logical-expiry strategy
    pub fn cold_miss(mut self, policy: ColdMissPolicy) -> Self {
        self.cold_miss = policy;
        self
    }
}
