//! Redis Store Example
//!
//! Run with: cargo run --example redis_store --features redis
//! Requires a Redis server on localhost:6379.

use herd_cache::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Shop {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let store = RedisStore::new(RedisConfig::new("redis://127.0.0.1:6379").prefix("demo")).await?;
    let client = CacheClient::with_config(store, CacheClientConfig::with_namespace("shopd"));

    let loader = LoaderFn::new(|id: u64| async move {
        Ok(Some(Shop {
            id,
            name: "Corner Espresso".to_string(),
        }))
    });

    let shop = client
        .get_or_load_exclusive("shop:", &1u64, &loader, Duration::from_secs(600))
        .await?;
    println!("Loaded via mutex strategy: {:?}", shop.map(|s| s.name));

    client.invalidate("shop:", &1u64).await?;
    println!("Invalidated shop 1");

    Ok(())
}
