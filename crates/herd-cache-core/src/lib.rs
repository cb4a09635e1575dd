//! herd-cache-core: Core traits and types for the herd-cache library
//!
//! This crate provides the foundational types and traits used throughout
//! the herd-cache ecosystem: the cache store port, the codec, the loader
//! contract, and the shared value types the loading strategies build on.

mod error;
mod traits;
mod types;

pub use error::{CacheError, Result};
pub use traits::*;
pub use types::*;
