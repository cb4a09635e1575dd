//! Logical-expiry loading: serve stale, rebuild in the background

use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use herd_cache_core::{
    CacheMetrics, CacheOperation, CacheStore, Codec, Loader, Result, TimedEnvelope,
};

use super::{CacheClient, ColdMissPolicy};

impl<B, C, M> CacheClient<B, C, M>
where
    B: CacheStore,
    C: Codec,
    M: CacheMetrics,
{
    /// Warm-up write: wrap `value` in a logical-expiry envelope and store
    /// it with no store-level TTL.
    ///
    /// Keys read via [`get_stale_while_revalidate`](Self::get_stale_while_revalidate)
    /// are expected to be populated through this method (or by a completed
    /// background rebuild) first.
    pub async fn set_with_logical_expiry<K, V>(
        &self,
        key_prefix: &str,
        id: &K,
        value: &V,
        ttl: Duration,
    ) -> Result<()>
    where
        K: Display + Send + Sync,
        V: Serialize,
    {
        let key = self.data_key(key_prefix, id);
        let envelope = TimedEnvelope::wrap(self.codec.encode(value)?, ttl);
        let text = self.codec.encode(&envelope)?;

        let start = Instant::now();
        self.store.set(&key, &text, None).await?;
        self.metrics
            .record_latency(CacheOperation::Set, start.elapsed());
        Ok(())
    }

    /// Get a record through its logical-expiry envelope, never waiting for
    /// a rebuild.
    ///
    /// A fresh envelope is returned directly. An expired one is still
    /// returned immediately, while (if the rebuild lock is won) a rebuild
    /// job is handed to the background pool: it reloads the record, writes
    /// a fresh envelope with `expire_at = now + ttl`, and releases the lock
    /// whatever the outcome. Readers therefore observe data at most one
    /// rebuild duration stale after logical expiry.
    ///
    /// A key that is not cached at all is handled per
    /// [`ColdMissPolicy`](super::ColdMissPolicy): by default this strategy
    /// assumes pre-warmed keys and reports absence without loading.
    pub async fn get_stale_while_revalidate<K, V, L>(
        &self,
        key_prefix: &str,
        id: &K,
        loader: &Arc<L>,
        ttl: Duration,
    ) -> Result<Option<V>>
    where
        K: Display + Clone + Send + Sync + 'static,
        V: Serialize + DeserializeOwned + Send + 'static,
        L: Loader<K, V>,
    {
        let key = self.data_key(key_prefix, id);

        let start = Instant::now();
        let raw = self.store.get(&key).await?;
        self.metrics
            .record_latency(CacheOperation::Get, start.elapsed());

        let text = match raw {
            Some(text) if !text.is_empty() => text,
            _ => return self.cold_miss(&key, id, loader.as_ref(), ttl).await,
        };

        let envelope: TimedEnvelope = self.codec.decode(&text)?;
        let value = if envelope.is_absent() {
            None
        } else {
            Some(self.codec.decode::<V>(&envelope.data)?)
        };

        if !envelope.is_expired() {
            match &value {
                Some(_) => self.metrics.record_hit(&key),
                None => self.metrics.record_absent_hit(&key),
            }
            return Ok(value);
        }

        // Expired: schedule a rebuild if nobody else is on it, then serve
        // the stale value without waiting.
        self.metrics.record_stale_hit(&key);
        if self.lock.try_lock(&key).await? {
            self.metrics.record_rebuild_scheduled(&key);
            self.spawn_rebuild(key, id.clone(), Arc::clone(loader), ttl)
                .await?;
        } else {
            self.metrics.record_lock_contention(&key);
        }

        Ok(value)
    }

    /// Cold key: the envelope has never been written (or was deleted)
    async fn cold_miss<K, V, L>(
        &self,
        key: &str,
        id: &K,
        loader: &L,
        ttl: Duration,
    ) -> Result<Option<V>>
    where
        K: Send + Sync,
        V: Serialize + DeserializeOwned,
        L: Loader<K, V>,
    {
        self.metrics.record_miss(key);
        match self.config.cold_miss {
            ColdMissPolicy::ReturnAbsent => Ok(None),
            ColdMissPolicy::LoadThrough => {
                let start = Instant::now();
                let loaded =
                    load_into_envelope(&*self.store, &*self.codec, loader, key, id, ttl).await?;
                self.metrics
                    .record_latency(CacheOperation::Load, start.elapsed());
                Ok(loaded)
            }
        }
    }

    /// Hand a rebuild job to the pool, holding the rebuild lock
    ///
    /// When the queue rejects the job the lock is released on the spot;
    /// otherwise the key would stay locked until the lock TTL lapses.
    async fn spawn_rebuild<K, V, L>(
        &self,
        key: String,
        id: K,
        loader: Arc<L>,
        ttl: Duration,
    ) -> Result<()>
    where
        K: Send + Sync + 'static,
        V: Serialize + Send + 'static,
        L: Loader<K, V>,
    {
        let store = Arc::clone(&self.store);
        let codec = Arc::clone(&self.codec);
        let metrics = Arc::clone(&self.metrics);
        let lock = self.lock.clone();
        let task_key = key.clone();

        let submitted = self.rebuild.try_submit(async move {
            let start = Instant::now();
            if let Err(e) =
                load_into_envelope(&*store, &*codec, &*loader, &task_key, &id, ttl).await
            {
                warn!(key = %task_key, error = %e, "background rebuild failed");
            }
            metrics.record_latency(CacheOperation::Rebuild, start.elapsed());
            if let Err(e) = lock.unlock(&task_key).await {
                warn!(key = %task_key, error = %e, "failed to release rebuild lock");
            }
        });

        if !submitted {
            warn!(key = %key, "rebuild queue full, dropping rebuild");
            self.lock.unlock(&key).await?;
        }
        Ok(())
    }
}

/// Load a record and publish it as a fresh envelope with no store TTL.
///
/// Absence is published too, as an envelope with an empty payload, so a
/// confirmed miss is served from cache until the next logical expiry.
async fn load_into_envelope<B, C, K, V, L>(
    store: &B,
    codec: &C,
    loader: &L,
    key: &str,
    id: &K,
    ttl: Duration,
) -> Result<Option<V>>
where
    B: CacheStore,
    C: Codec,
    K: Send + Sync,
    V: Serialize,
    L: Loader<K, V>,
{
    let loaded = loader.load(id).await?;
    let envelope = match &loaded {
        Some(value) => TimedEnvelope::wrap(codec.encode(value)?, ttl),
        None => TimedEnvelope::absent(ttl),
    };
    store.set(key, &codec.encode(&envelope)?, None).await?;
    Ok(loaded)
}
