//! Cache probe outcome

/// The cached sentinel meaning "confirmed not present in the store".
///
/// Distinct from the key being missing entirely: a key holding this marker
/// absorbs repeat lookups for nonexistent ids for the null-value TTL.
pub const ABSENT_MARKER: &str = "";

/// Outcome of probing the cache for a key.
///
/// Every loading strategy starts from this three-way split; the strategies
/// differ only in what they do on `Missing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Key present with a non-empty payload
    Hit(String),
    /// Key present holding the absent marker
    ConfirmedAbsent,
    /// Key not cached at all (never cached, or evicted by TTL)
    Missing,
}

impl Lookup {
    /// Classify a raw store read
    pub fn from_raw(raw: Option<String>) -> Self {
        match raw {
            Some(s) if s == ABSENT_MARKER => Lookup::ConfirmedAbsent,
            Some(s) => Lookup::Hit(s),
            None => Lookup::Missing,
        }
    }

    /// Check if this is a hit with a payload
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// Check if the key was not cached at all
    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }

    /// Extract the payload, consuming the outcome
    pub fn into_payload(self) -> Option<String> {
        match self {
            Lookup::Hit(payload) => Some(payload),
            _ => None,
        }
    }
}
