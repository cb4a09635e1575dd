//! Logical-expiry envelope

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A cached value carrying its own expiry timestamp.
///
/// Stored under the data key with no store-level TTL; freshness is decided
/// by comparing `expire_at` against the wall clock at read time, so an
/// expired envelope stays readable while a rebuild is in flight. Envelopes
/// are replaced wholesale, never mutated in place.
///
/// `data` holds the codec-encoded record, or the empty string when the
/// loader confirmed the record is absent from the authoritative store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEnvelope {
    /// Inner-encoded record payload
    pub data: String,
    /// Expiry instant as milliseconds since the Unix epoch
    pub expire_at: i64,
}

impl TimedEnvelope {
    /// Wrap an encoded payload with an expiry `ttl` from now
    pub fn wrap(data: String, ttl: Duration) -> Self {
        Self {
            data,
            expire_at: now_millis() + ttl.as_millis() as i64,
        }
    }

    /// Envelope recording a confirmed-absent record
    pub fn absent(ttl: Duration) -> Self {
        Self::wrap(String::new(), ttl)
    }

    /// Whether the logical expiry has passed
    pub fn is_expired(&self) -> bool {
        now_millis() >= self.expire_at
    }

    /// Whether this envelope records a confirmed-absent record
    pub fn is_absent(&self) -> bool {
        self.data.is_empty()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
