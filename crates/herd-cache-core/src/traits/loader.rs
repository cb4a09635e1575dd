//! Loader trait: the bridge to the authoritative store

use crate::Result;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// Trait for loading a record from the authoritative store on cache miss.
///
/// `Ok(None)` means "confirmed absent" and is a normal result, not an
/// error; the strategies cache it as a negative entry. The cache layer
/// assumes `load` has no side effects it needs to coordinate with.
#[async_trait]
pub trait Loader<K, V>: Send + Sync + 'static {
    /// Load the record for the given id
    async fn load(&self, id: &K) -> Result<Option<V>>;
}

/// Adapter lifting an async closure into a [`Loader`].
///
/// The closure takes the id by value, so `K: Clone` is required at the
/// call sites that use it.
pub struct LoaderFn<F, K, V> {
    f: F,
    _phantom: PhantomData<fn(K) -> V>,
}

impl<F, K, V> LoaderFn<F, K, V> {
    /// Wrap an async closure
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, K, V> Loader<K, V> for LoaderFn<F, K, V>
where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<V>>> + Send,
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    async fn load(&self, id: &K) -> Result<Option<V>> {
        (self.f)(id.clone()).await
    }
}
