//! Metrics trait for cache observability

use std::time::Duration;

/// Cache operation for latency tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOperation {
    Get,
    Set,
    Load,
    Rebuild,
}

impl CacheOperation {
    /// Get operation as string label
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOperation::Get => "get",
            CacheOperation::Set => "set",
            CacheOperation::Load => "load",
            CacheOperation::Rebuild => "rebuild",
        }
    }
}

/// Trait for cache metrics/observability
///
/// Implement this to integrate with your metrics system.
pub trait CacheMetrics: Send + Sync + 'static {
    /// Record a fresh cache hit
    fn record_hit(&self, key: &str);

    /// Record a cache miss
    fn record_miss(&self, key: &str);

    /// Record a confirmed-absent hit (negative entry served from cache)
    fn record_absent_hit(&self, key: &str);

    /// Record a stale hit (logically expired value served while rebuilding)
    fn record_stale_hit(&self, key: &str);

    /// Record a lost race for the rebuild lock
    fn record_lock_contention(&self, key: &str);

    /// Record a rebuild handed to the background pool
    fn record_rebuild_scheduled(&self, key: &str);

    /// Record operation latency
    fn record_latency(&self, operation: CacheOperation, duration: Duration);
}

/// No-op metrics implementation (default)
///
/// Zero overhead when metrics are not needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl CacheMetrics for NoopMetrics {
    #[inline]
    fn record_hit(&self, _key: &str) {}

    #[inline]
    fn record_miss(&self, _key: &str) {}

    #[inline]
    fn record_absent_hit(&self, _key: &str) {}

    #[inline]
    fn record_stale_hit(&self, _key: &str) {}

    #[inline]
    fn record_lock_contention(&self, _key: &str) {}

    #[inline]
    fn record_rebuild_scheduled(&self, _key: &str) {}

    #[inline]
    fn record_latency(&self, _operation: CacheOperation, _duration: Duration) {}
}
