//! Time-expiring key/value cache
//!
//! Thin wrapper over a moka future cache with a fixed time-to-live. Owned by
//! whoever needs it (application state), never a global. Writers call
//! [`TtlCache::invalidate`] after changing the underlying data.

use moka::future::Cache as MokaCache;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use crate::Result;

const DEFAULT_CAPACITY: u64 = 1_000;

#[derive(Clone)]
pub struct TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: MokaCache<K, V>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: u64) -> Self {
        let inner = MokaCache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        TtlCache { inner, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value, or None when absent or expired
    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Read-through: return the cached value or load, store and return it
    ///
    /// Loader errors are returned as-is and nothing is cached.
    pub async fn get_or_load<F, Fut>(&self, key: K, load: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.inner.get(&key).await {
            return Ok(value);
        }
        let value = load().await?;
        self.inner.insert(key, value.clone()).await;
        Ok(value)
    }
}
