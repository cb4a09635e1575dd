//! Pass-Through Example
//!
//! Demonstrates cache-aside reads with penetration protection: the first
//! lookup of a nonexistent id consults the loader, every later one is
//! absorbed by the cached absent marker.

use herd_cache::prelude::*;
use herd_cache::MemoryStore;
use std::time::Duration;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Shop {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let client = CacheClient::new(MemoryStore::new());

    // Stands in for the authoritative store: only shop 1 exists.
    let loader = LoaderFn::new(|id: u64| async move {
        println!("  (loader consulted for id {id})");
        Ok((id == 1).then(|| Shop {
            id,
            name: "Corner Espresso".to_string(),
        }))
    });

    println!("=== Pass-Through Demo ===\n");

    println!("First lookup of shop 1 (cold):");
    let shop = client
        .get_or_load("shop:", &1u64, &loader, Duration::from_secs(600))
        .await?;
    println!("  -> {:?}\n", shop.map(|s| s.name));

    println!("Second lookup of shop 1 (cached, loader stays quiet):");
    let shop = client
        .get_or_load("shop:", &1u64, &loader, Duration::from_secs(600))
        .await?;
    println!("  -> {:?}\n", shop.map(|s| s.name));

    println!("Lookups of shop 999 (absent everywhere):");
    for attempt in 1..=3 {
        let shop: Option<Shop> = client
            .get_or_load("shop:", &999u64, &loader, Duration::from_secs(600))
            .await?;
        println!("  attempt {attempt}: {:?}", shop.map(|s| s.name));
    }
    println!("\nOnly the first attempt reached the loader; the rest hit the absent marker.");

    Ok(())
}
