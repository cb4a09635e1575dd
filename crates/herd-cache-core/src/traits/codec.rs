//! Pluggable record↔text codec

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Trait for reversible record↔text conversion.
///
/// The store holds text values, so the codec produces `String` rather than
/// bytes. Implementations must round-trip: `decode(encode(x)) == x` for
/// every valid record.
pub trait Codec: Send + Sync + Clone + 'static {
    /// Name of the codec (for debugging/metrics)
    fn name(&self) -> &str;

    /// Encode a record to its cached text form
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CacheError>;

    /// Decode cached text back into a record
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CacheError>;
}

/// JSON codec (default)
///
/// Human-readable and debuggable straight from the store.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CacheError> {
        serde_json::to_string(value).map_err(|e| CacheError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CacheError> {
        serde_json::from_str(text).map_err(|e| CacheError::Decode(e.to_string()))
    }
}
