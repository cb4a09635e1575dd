//! herd-cache: Cache-aside access layer with penetration and breakdown
//! protection
//!
//! # Features
//!
//! - **Penetration protection**: confirmed-absent ids are cached as
//!   negative entries, so lookups for nonexistent keys stop at the cache
//! - **Breakdown protection, blocking flavor**: a distributed rebuild lock
//!   lets exactly one caller rebuild an expired hot key while the rest
//!   retry against the cache
//! - **Breakdown protection, non-blocking flavor**: logical expiry serves
//!   stale data instantly and rebuilds in a bounded background pool
//! - **Pluggable stores** (memory, Redis), **codec** (JSON), and
//!   **metrics**
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use herd_cache::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let client = CacheClient::new(MemoryStore::new());
//!
//!     // The loader stands in for the authoritative store.
//!     let loader = LoaderFn::new(|id: u64| async move {
//!         Ok(if id == 1 { Some(format!("record-{id}")) } else { None })
//!     });
//!
//!     match client
//!         .get_or_load("item:", &1u64, &loader, Duration::from_secs(600))
//!         .await?
//!     {
//!         Some(record) => println!("Got: {record}"),
//!         None => println!("Not found"),
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;

// Re-export core
pub use herd_cache_core::*;

// Re-export storage
#[cfg(feature = "memory")]
pub use herd_cache_storage::{MemoryStats, MemoryStore};

#[cfg(feature = "redis")]
pub use herd_cache_storage::{RedisConfig, RedisStore};

// Export client
pub use client::{CacheClient, CacheClientConfig, ColdMissPolicy, RebuildLock, RebuildPool};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CacheClient, CacheClientConfig, CacheError, Codec, ColdMissPolicy, JsonCodec, Loader,
        LoaderFn, Result,
    };

    #[cfg(feature = "memory")]
    pub use crate::MemoryStore;

    #[cfg(feature = "redis")]
    pub use crate::{RedisConfig, RedisStore};
}

#[cfg(test)]
mod tests;
