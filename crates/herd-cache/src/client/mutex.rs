//! Mutex-guarded loading: one rebuild per key, everyone else waits

use std::fmt::Display;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use herd_cache_core::{CacheError, CacheMetrics, CacheStore, Codec, Loader, Lookup, Result};

use super::CacheClient;

impl<B, C, M> CacheClient<B, C, M>
where
    B: CacheStore,
    C: Codec,
    M: CacheMetrics,
{
    /// Get a record from cache; on a true miss, rebuild under the rebuild
    /// lock.
    ///
    /// Extends [`get_or_load`](Self::get_or_load): at most one caller per
    /// key attempts the rebuild at a time. A caller that loses the lock
    /// race sleeps for `lock_retry_interval` and retries the whole
    /// operation from the top, so it picks up whatever the winner
    /// published. Exhausting `max_lock_retries` attempts fails with
    /// [`CacheError::RebuildTimeout`].
    ///
    /// Correctness does not depend on the mutual exclusion; a duplicate
    /// rebuild would overwrite the cache with equivalent data. The lock
    /// only keeps redundant load pressure off the authoritative store.
    pub async fn get_or_load_exclusive<K, V, L>(
        &self,
        key_prefix: &str,
        id: &K,
        loader: &L,
        ttl: Duration,
    ) -> Result<Option<V>>
    where
        K: Display + Send + Sync,
        V: Serialize + DeserializeOwned,
        L: Loader<K, V>,
    {
        let key = self.data_key(key_prefix, id);

        for _ in 0..self.config.max_lock_retries {
            match self.probe(&key).await? {
                Lookup::Hit(payload) => return Ok(Some(self.codec.decode(&payload)?)),
                Lookup::ConfirmedAbsent => return Ok(None),
                Lookup::Missing => {}
            }

            if self.lock.try_lock(&key).await? {
                let result = self.load_and_populate(&key, id, loader, ttl).await;
                // Released on success and on loader/store failure alike.
                if let Err(e) = self.lock.unlock(&key).await {
                    warn!(key = %key, error = %e, "failed to release rebuild lock");
                }
                return result;
            }

            self.metrics.record_lock_contention(&key);
            debug!(key = %key, "rebuild in progress elsewhere, backing off");
            sleep(self.config.lock_retry_interval).await;
        }

        Err(CacheError::RebuildTimeout(key))
    }
}
