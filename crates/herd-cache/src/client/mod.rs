//! High-level cache-aside client

use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use herd_cache_core::{
    CacheMetrics, CacheOperation, CacheStore, Codec, JsonCodec, Loader, Lookup, NoopMetrics,
    Result, ABSENT_MARKER,
};

mod config;
pub use config::{CacheClientConfig, ColdMissPolicy};

mod lock;
pub use lock::RebuildLock;

mod rebuild;
pub use rebuild::RebuildPool;

mod logical_expire;
mod mutex;
mod pass_through;

/// Cache-aside access layer between request handlers and a slower
/// authoritative store.
///
/// Generic over:
/// - `B`: the cache store (memory, Redis)
/// - `C`: the codec (JSON by default)
/// - `M`: the metrics collector
///
/// Three loading strategies are offered per call, sharing one probe
/// primitive and one rebuild lock:
/// - [`get_or_load`](Self::get_or_load): pass-through with penetration
///   protection (absent ids are cached as negative entries);
/// - [`get_or_load_exclusive`](Self::get_or_load_exclusive): adds a
///   rebuild lock so one caller rebuilds while the rest wait and retry;
/// - [`get_stale_while_revalidate`](Self::get_stale_while_revalidate):
///   logical expiry, serving stale data instantly while a rebuild runs in
///   the background pool.
///
/// Must be constructed inside a tokio runtime; the rebuild workers are
/// spawned on it. Cloning shares the store, the pool, and the lock.
pub struct CacheClient<B, C = JsonCodec, M = NoopMetrics>
where
    B: CacheStore,
    C: Codec,
    M: CacheMetrics,
{
    store: Arc<B>,
    codec: Arc<C>,
    metrics: Arc<M>,
    config: CacheClientConfig,
    lock: RebuildLock<B>,
    rebuild: Arc<RebuildPool>,
}

// Constructors for default codec/metrics
impl<B: CacheStore> CacheClient<B, JsonCodec, NoopMetrics> {
    /// Create a new CacheClient with the JSON codec and no metrics
    pub fn new(store: B) -> Self {
        Self::with_config(store, CacheClientConfig::default())
    }

    /// Create with custom config
    pub fn with_config(store: B, config: CacheClientConfig) -> Self {
        Self::with_codec_and_metrics(store, JsonCodec, NoopMetrics, config)
    }
}

// Full generic implementation
impl<B, C, M> CacheClient<B, C, M>
where
    B: CacheStore,
    C: Codec,
    M: CacheMetrics,
{
    /// Create a CacheClient with custom codec and metrics
    pub fn with_codec_and_metrics(store: B, codec: C, metrics: M, config: CacheClientConfig) -> Self {
        let store = Arc::new(store);
        let lock = RebuildLock::new(Arc::clone(&store), config.lock_ttl);
        let rebuild = Arc::new(RebuildPool::new(
            config.rebuild_workers,
            config.rebuild_queue_depth,
        ));

        Self {
            store,
            codec: Arc::new(codec),
            metrics: Arc::new(metrics),
            config,
            lock,
            rebuild,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &CacheClientConfig {
        &self.config
    }

    /// Build the full data key for an id, with the namespace prefix applied
    pub(crate) fn data_key(&self, key_prefix: &str, id: &impl Display) -> String {
        match &self.config.namespace {
            Some(ns) => format!("{ns}:{key_prefix}{id}"),
            None => format!("{key_prefix}{id}"),
        }
    }

    /// Read the cache and classify the outcome
    pub(crate) async fn probe(&self, key: &str) -> Result<Lookup> {
        let start = Instant::now();
        let raw = self.store.get(key).await?;
        self.metrics
            .record_latency(CacheOperation::Get, start.elapsed());

        let lookup = Lookup::from_raw(raw);
        match &lookup {
            Lookup::Hit(_) => self.metrics.record_hit(key),
            Lookup::ConfirmedAbsent => self.metrics.record_absent_hit(key),
            Lookup::Missing => self.metrics.record_miss(key),
        }
        Ok(lookup)
    }

    /// Consult the loader and populate the cache with the outcome
    ///
    /// A present record is stored under `ttl`; absence is stored as the
    /// absent marker under the (shorter) null-value TTL, so repeat lookups
    /// for a nonexistent id stop reaching the loader.
    pub(crate) async fn load_and_populate<K, V, L>(
        &self,
        key: &str,
        id: &K,
        loader: &L,
        ttl: Duration,
    ) -> Result<Option<V>>
    where
        K: Send + Sync,
        V: Serialize,
        L: Loader<K, V>,
    {
        let start = Instant::now();
        let loaded = loader.load(id).await?;
        self.metrics
            .record_latency(CacheOperation::Load, start.elapsed());

        match loaded {
            Some(value) => {
                let payload = self.codec.encode(&value)?;
                self.store.set(key, &payload, Some(ttl)).await?;
                Ok(Some(value))
            }
            None => {
                self.store
                    .set(key, ABSENT_MARKER, Some(self.config.null_value_ttl))
                    .await?;
                Ok(None)
            }
        }
    }

    /// Encode and store a record with a store-level TTL
    pub async fn set<K, V>(&self, key_prefix: &str, id: &K, value: &V, ttl: Duration) -> Result<()>
    where
        K: Display + Send + Sync,
        V: Serialize,
    {
        let key = self.data_key(key_prefix, id);
        let payload = self.codec.encode(value)?;

        let start = Instant::now();
        self.store.set(&key, &payload, Some(ttl)).await?;
        self.metrics
            .record_latency(CacheOperation::Set, start.elapsed());
        Ok(())
    }

    /// Drop the cached entry for an id
    ///
    /// The cache-aside write path: update the authoritative store first,
    /// then evict here so the next read rebuilds.
    pub async fn invalidate<K>(&self, key_prefix: &str, id: &K) -> Result<bool>
    where
        K: Display + Send + Sync,
    {
        let key = self.data_key(key_prefix, id);
        self.store.delete(&key).await
    }

    /// Close the rebuild queue, drain pending rebuilds, and join the workers
    pub async fn shutdown(&self) {
        self.rebuild.shutdown().await;
    }
}

impl<B, C, M> Clone for CacheClient<B, C, M>
where
    B: CacheStore,
    C: Codec,
    M: CacheMetrics,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            metrics: Arc::clone(&self.metrics),
            config: self.config.clone(),
            lock: self.lock.clone(),
            rebuild: Arc::clone(&self.rebuild),
        }
    }
}
