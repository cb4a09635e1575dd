use crate::{CacheMetrics, CacheOperation};
use std::time::Duration;
use tracing::debug;

/// Metrics adapter that logs events via `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingMetrics {
    /// Service name/prefix (optional)
    service_name: Option<String>,
}

impl TracingMetrics {
    /// Create new tracing metrics adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with service name prefix
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }
}

impl CacheMetrics for TracingMetrics {
    fn record_hit(&self, key: &str) {
        debug!(
            target: "herd_cache",
            event = "hit",
            key = %key,
            service = ?self.service_name,
            "Cache Hit"
        );
    }

    fn record_miss(&self, key: &str) {
        debug!(
            target: "herd_cache",
            event = "miss",
            key = %key,
            service = ?self.service_name,
            "Cache Miss"
        );
    }

    fn record_absent_hit(&self, key: &str) {
        debug!(
            target: "herd_cache",
            event = "absent_hit",
            key = %key,
            service = ?self.service_name,
            "Confirmed-Absent Hit"
        );
    }

    fn record_stale_hit(&self, key: &str) {
        debug!(
            target: "herd_cache",
            event = "stale_hit",
            key = %key,
            service = ?self.service_name,
            "Cache Stale Hit"
        );
    }

    fn record_lock_contention(&self, key: &str) {
        debug!(
            target: "herd_cache",
            event = "lock_contention",
            key = %key,
            service = ?self.service_name,
            "Rebuild Lock Contention"
        );
    }

    fn record_rebuild_scheduled(&self, key: &str) {
        debug!(
            target: "herd_cache",
            event = "rebuild_scheduled",
            key = %key,
            service = ?self.service_name,
            "Background Rebuild Scheduled"
        );
    }

    fn record_latency(&self, operation: CacheOperation, duration: Duration) {
        tracing::trace!(
            target: "herd_cache",
            event = "latency",
            operation = operation.as_str(),
            duration_us = duration.as_micros() as u64,
            service = ?self.service_name,
            "Operation Latency"
        );
    }
}
