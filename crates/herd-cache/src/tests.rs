//! Integration tests for CacheClient

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::{CacheStore, MemoryStore, TimedEnvelope};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct TestData {
        id: u64,
        name: String,
        stock: i32,
    }

    fn data(name: &str) -> TestData {
        TestData {
            id: 1,
            name: name.to_string(),
            stock: 7,
        }
    }

    /// Loader stub that counts calls and returns a fixed answer
    struct CountingLoader {
        calls: AtomicUsize,
        value: Option<TestData>,
        delay: Option<Duration>,
        fail: bool,
    }

    impl CountingLoader {
        fn some(value: TestData) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                value: Some(value),
                delay: None,
                fail: false,
            }
        }

        fn absent() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                value: None,
                delay: None,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                value: None,
                delay: None,
                fail: true,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Loader<u64, TestData> for CountingLoader {
        async fn load(&self, _id: &u64) -> Result<Option<TestData>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(CacheError::Store("backing store unreachable".to_string()));
            }
            Ok(self.value.clone())
        }
    }

    fn epoch_millis_now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64
    }

    /// Raw envelope text whose logical expiry lies one hour in the past
    fn expired_envelope(value: &TestData) -> String {
        let codec = JsonCodec;
        let envelope = TimedEnvelope {
            data: codec.encode(value).unwrap(),
            expire_at: epoch_millis_now() - 3_600_000,
        };
        codec.encode(&envelope).unwrap()
    }

    const TTL: Duration = Duration::from_secs(600);

    // --- pass-through -----------------------------------------------------

    #[tokio::test]
    async fn test_pass_through_loads_then_hits_cache() {
        let client = CacheClient::new(MemoryStore::new());
        let loader = CountingLoader::some(data("fresh"));

        let first = client.get_or_load("item:", &1u64, &loader, TTL).await.unwrap();
        assert_eq!(first, Some(data("fresh")));
        assert_eq!(loader.calls(), 1);

        let second = client.get_or_load("item:", &1u64, &loader, TTL).await.unwrap();
        assert_eq!(second, Some(data("fresh")));
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn test_pass_through_penetration_guard() {
        let store = MemoryStore::new();
        let client = CacheClient::new(store.clone());
        let loader = CountingLoader::absent();

        for _ in 0..5 {
            let result: Option<TestData> =
                client.get_or_load("item:", &404u64, &loader, TTL).await.unwrap();
            assert_eq!(result, None);
        }
        // One confirmed miss, then the cache absorbs the rest.
        assert_eq!(loader.calls(), 1);
        assert_eq!(store.get("item:404").await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn test_pass_through_absent_marker_expires() {
        let config = CacheClientConfig::default().null_value_ttl(Duration::from_millis(40));
        let client = CacheClient::with_config(MemoryStore::new(), config);
        let loader = CountingLoader::absent();

        let _: Option<TestData> = client.get_or_load("item:", &404u64, &loader, TTL).await.unwrap();
        assert_eq!(loader.calls(), 1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        let _: Option<TestData> = client.get_or_load("item:", &404u64, &loader, TTL).await.unwrap();
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test]
    async fn test_pass_through_reloads_after_ttl() {
        let client = CacheClient::new(MemoryStore::new());
        let loader = CountingLoader::some(data("fresh"));
        let short = Duration::from_millis(40);

        let _ = client.get_or_load("item:", &1u64, &loader, short).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        let _ = client.get_or_load("item:", &1u64, &loader, short).await.unwrap();
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test]
    async fn test_pass_through_decode_error_propagates() {
        let store = MemoryStore::new();
        store.set("item:1", "{not json", None).await.unwrap();
        let client = CacheClient::new(store);
        let loader = CountingLoader::some(data("fresh"));

        let err = client
            .get_or_load::<u64, TestData, _>("item:", &1u64, &loader, TTL)
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Decode(_)));
        assert_eq!(loader.calls(), 0);
    }

    // --- mutex ------------------------------------------------------------

    #[tokio::test]
    async fn test_mutex_single_rebuild_under_race() {
        let client = CacheClient::new(MemoryStore::new());
        let loader = Arc::new(
            CountingLoader::some(data("fresh")).with_delay(Duration::from_millis(100)),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = client.clone();
            let loader = Arc::clone(&loader);
            handles.push(tokio::spawn(async move {
                client
                    .get_or_load_exclusive("item:", &1u64, loader.as_ref(), TTL)
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result, Some(data("fresh")));
        }
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn test_mutex_serves_absent_hit_without_locking() {
        let store = MemoryStore::new();
        store.set("item:404", "", None).await.unwrap();
        let client = CacheClient::new(store);
        let loader = CountingLoader::some(data("fresh"));

        let result: Option<TestData> = client
            .get_or_load_exclusive("item:", &404u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_mutex_times_out_when_lock_never_frees() {
        let store = MemoryStore::new();
        // Foreign holder that never releases within the test window.
        store
            .set_nx("lock:item:1", "1", Duration::from_secs(60))
            .await
            .unwrap();

        let config = CacheClientConfig::default().lock_retries(Duration::from_millis(10), 3);
        let client = CacheClient::with_config(store, config);
        let loader = CountingLoader::some(data("fresh"));

        let err = client
            .get_or_load_exclusive::<u64, TestData, _>("item:", &1u64, &loader, TTL)
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::RebuildTimeout(_)));
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_mutex_releases_lock_after_loader_error() {
        let store = MemoryStore::new();
        let client = CacheClient::new(store.clone());

        let failing = CountingLoader::failing();
        let err = client
            .get_or_load_exclusive::<u64, TestData, _>("item:", &1u64, &failing, TTL)
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Store(_)));
        // The lock must not leak past the failure.
        assert_eq!(store.get("lock:item:1").await.unwrap(), None);

        let loader = CountingLoader::some(data("fresh"));
        let result = client
            .get_or_load_exclusive("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(result, Some(data("fresh")));
        assert_eq!(loader.calls(), 1);
    }

    // --- logical expiry ---------------------------------------------------

    #[tokio::test]
    async fn test_swr_fresh_envelope_needs_no_loader() {
        let client = CacheClient::new(MemoryStore::new());
        client
            .set_with_logical_expiry("item:", &1u64, &data("warm"), TTL)
            .await
            .unwrap();

        let loader = Arc::new(CountingLoader::some(data("new")));
        let result = client
            .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(result, Some(data("warm")));
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_swr_serves_stale_then_rebuilds() {
        let store = MemoryStore::new();
        store
            .set("item:1", &expired_envelope(&data("old")), None)
            .await
            .unwrap();
        let client = CacheClient::new(store.clone());
        let loader = Arc::new(CountingLoader::some(data("new")));

        // Stale value comes back immediately...
        let stale = client
            .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(stale, Some(data("old")));

        // ...and the background rebuild publishes the fresh one.
        client.shutdown().await;
        let fresh = client
            .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(fresh, Some(data("new")));
        assert_eq!(loader.calls(), 1);
        // The rebuild released its lock.
        assert_eq!(store.get("lock:item:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_swr_does_not_block_on_slow_rebuild() {
        let store = MemoryStore::new();
        store
            .set("item:1", &expired_envelope(&data("old")), None)
            .await
            .unwrap();
        let client = CacheClient::new(store);
        let loader = Arc::new(
            CountingLoader::some(data("new")).with_delay(Duration::from_millis(300)),
        );

        let start = Instant::now();
        let stale = client
            .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(stale, Some(data("old")));
        assert!(
            start.elapsed() < Duration::from_millis(150),
            "stale read must not wait for the rebuild"
        );

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_swr_concurrent_readers_schedule_one_rebuild() {
        let store = MemoryStore::new();
        store
            .set("item:1", &expired_envelope(&data("old")), None)
            .await
            .unwrap();
        let client = CacheClient::new(store);
        let loader = Arc::new(
            CountingLoader::some(data("new")).with_delay(Duration::from_millis(300)),
        );

        let mut handles = Vec::new();
        for _ in 0..2 {
            let client = client.clone();
            let loader = Arc::clone(&loader);
            handles.push(tokio::spawn(async move {
                client
                    .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result, Some(data("old")));
        }

        client.shutdown().await;
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn test_swr_cold_miss_returns_absent_by_default() {
        let client = CacheClient::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::some(data("new")));

        let result = client
            .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_swr_cold_miss_load_through() {
        let config = CacheClientConfig::default().cold_miss(ColdMissPolicy::LoadThrough);
        let client = CacheClient::with_config(MemoryStore::new(), config);
        let loader = Arc::new(CountingLoader::some(data("new")));

        let first = client
            .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(first, Some(data("new")));
        assert_eq!(loader.calls(), 1);

        // The first load wrote the envelope; the second read is a fresh hit.
        let second = client
            .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(second, Some(data("new")));
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn test_swr_load_through_caches_absence() {
        let config = CacheClientConfig::default().cold_miss(ColdMissPolicy::LoadThrough);
        let client = CacheClient::with_config(MemoryStore::new(), config);
        let loader = Arc::new(CountingLoader::absent());

        for _ in 0..3 {
            let result: Option<TestData> = client
                .get_stale_while_revalidate("item:", &404u64, &loader, TTL)
                .await
                .unwrap();
            assert_eq!(result, None);
        }
        // Absence was published as an envelope and served from cache.
        assert_eq!(loader.calls(), 1);
    }

    #[tokio::test]
    async fn test_swr_failed_rebuild_keeps_stale_and_frees_lock() {
        let store = MemoryStore::new();
        store
            .set("item:1", &expired_envelope(&data("old")), None)
            .await
            .unwrap();
        let client = CacheClient::new(store.clone());
        let loader = Arc::new(CountingLoader::failing());

        let stale = client
            .get_stale_while_revalidate("item:", &1u64, &loader, TTL)
            .await
            .unwrap();
        assert_eq!(stale, Some(data("old")));

        client.shutdown().await;
        assert_eq!(loader.calls(), 1);
        // Failure released the lock and left the stale envelope in place.
        assert_eq!(store.get("lock:item:1").await.unwrap(), None);
        let again = CacheClient::new(store.clone());
        let retry_loader = Arc::new(CountingLoader::failing());
        let still_stale = again
            .get_stale_while_revalidate("item:", &1u64, &retry_loader, TTL)
            .await
            .unwrap();
        assert_eq!(still_stale, Some(data("old")));
        again.shutdown().await;
    }

    // --- direct writes and invalidation -----------------------------------

    #[tokio::test]
    async fn test_set_primes_the_cache() {
        let client = CacheClient::new(MemoryStore::new());
        client.set("item:", &1u64, &data("primed"), TTL).await.unwrap();

        let loader = CountingLoader::some(data("other"));
        let result = client.get_or_load("item:", &1u64, &loader, TTL).await.unwrap();
        assert_eq!(result, Some(data("primed")));
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let client = CacheClient::new(MemoryStore::new());
        let loader = CountingLoader::some(data("fresh"));

        let _ = client.get_or_load("item:", &1u64, &loader, TTL).await.unwrap();
        assert!(client.invalidate("item:", &1u64).await.unwrap());
        let _ = client.get_or_load("item:", &1u64, &loader, TTL).await.unwrap();
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test]
    async fn test_idempotent_overwrite() {
        let store = MemoryStore::new();
        let client = CacheClient::new(store.clone());

        client.set("item:", &1u64, &data("same"), TTL).await.unwrap();
        let first_raw = store.get("item:1").await.unwrap();
        client.set("item:", &1u64, &data("same"), TTL).await.unwrap();
        let second_raw = store.get("item:1").await.unwrap();

        assert_eq!(first_raw, second_raw);
        let loader = CountingLoader::absent();
        let result = client.get_or_load("item:", &1u64, &loader, TTL).await.unwrap();
        assert_eq!(result, Some(data("same")));
    }

    #[tokio::test]
    async fn test_namespace_prefixes_every_key() {
        let store = MemoryStore::new();
        let config = CacheClientConfig::with_namespace("app");
        let client = CacheClient::with_config(store.clone(), config);
        let loader = CountingLoader::some(data("fresh"));

        let _ = client.get_or_load("item:", &1u64, &loader, TTL).await.unwrap();
        assert!(store.get("app:item:1").await.unwrap().is_some());
        assert_eq!(store.get("item:1").await.unwrap(), None);
    }
}
