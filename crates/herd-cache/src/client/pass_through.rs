//! Pass-through loading with penetration protection

use std::fmt::Display;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use herd_cache_core::{CacheMetrics, CacheStore, Codec, Loader, Lookup, Result};

use super::CacheClient;

impl<B, C, M> CacheClient<B, C, M>
where
    B: CacheStore,
    C: Codec,
    M: CacheMetrics,
{
    /// Get a record from cache, falling through to the loader on a miss.
    ///
    /// A loader answer of "absent" is cached as a negative entry for the
    /// null-value TTL, so repeated lookups for an id that does not exist
    /// stop at the cache instead of hammering the authoritative store.
    /// `Ok(None)` is the normal not-found result.
    ///
    /// Makes at most one loader call and at most one cache write.
    pub async fn get_or_load<K, V, L>(
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

        match self.probe(&key).await? {
            Lookup::Hit(payload) => Ok(Some(self.codec.decode(&payload)?)),
            Lookup::ConfirmedAbsent => Ok(None),
            Lookup::Missing => self.load_and_populate(&key, id, loader, ttl).await,
        }
    }
}
