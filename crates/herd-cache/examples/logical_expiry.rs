//! Logical-Expiry Example
//!
//! Demonstrates serving stale data immediately while a bounded background
//! pool rebuilds the envelope, so no reader ever waits on a hot key.

use herd_cache::prelude::*;
use herd_cache::MemoryStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Shop {
    id: u64,
    name: String,
    visits: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let client = CacheClient::new(MemoryStore::new());

    let loader = Arc::new(LoaderFn::new(|id: u64| async move {
        // Simulate a slow authoritative store.
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(Some(Shop {
            id,
            name: "Corner Espresso".to_string(),
            visits: 1042,
        }))
    }));

    println!("=== Logical-Expiry Demo ===\n");

    // Warm up the key with a 1-second logical TTL.
    client
        .set_with_logical_expiry(
            "shop:",
            &1u64,
            &Shop {
                id: 1,
                name: "Corner Espresso".to_string(),
                visits: 1000,
            },
            Duration::from_secs(1),
        )
        .await?;
    println!("Warmed shop 1 with logical TTL = 1s");

    let shop = client
        .get_stale_while_revalidate("shop:", &1u64, &loader, Duration::from_secs(1))
        .await?;
    println!("T+0s: fresh read -> visits = {:?}", shop.map(|s| s.visits));

    println!("\nWaiting for the logical expiry to pass...\n");
    tokio::time::sleep(Duration::from_millis(1200)).await;

    // Expired: the stale value comes back instantly, a rebuild is queued.
    let shop = client
        .get_stale_while_revalidate("shop:", &1u64, &loader, Duration::from_secs(1))
        .await?;
    println!(
        "T+1.2s: stale read (instant) -> visits = {:?}",
        shop.map(|s| s.visits)
    );

    // Drain the pool so the rebuild has certainly landed.
    client.shutdown().await;

    let shop = client
        .get_stale_while_revalidate("shop:", &1u64, &loader, Duration::from_secs(1))
        .await?;
    println!(
        "After rebuild: fresh read -> visits = {:?}",
        shop.map(|s| s.visits)
    );

    Ok(())
}
