//! Core traits for cache operations

mod codec;
mod loader;
mod metrics;
mod store;

pub use codec::Codec;
pub use loader::{Loader, LoaderFn};
pub use metrics::{CacheMetrics, CacheOperation, NoopMetrics};
pub use store::CacheStore;

#[cfg(feature = "json")]
pub use codec::JsonCodec;

#[cfg(feature = "tracing")]
mod tracing;
#[cfg(feature = "tracing")]
pub use tracing::TracingMetrics;
