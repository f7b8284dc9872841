//! Shared Cache Module
//!
//! Task-safe handle around a [`TtlCache`].

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cache::{CacheStats, TtlCache};

// == Shared Cache ==
/// Cloneable handle to one store shared by every enrichment unit.
///
/// Each method takes the lock for exactly one store operation, so eviction
/// and expiry checks stay atomic with respect to size accounting. The lock
/// is never held across an await on anything else.
#[derive(Debug)]
pub struct SharedCache<V> {
    inner: Arc<Mutex<TtlCache<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> SharedCache<V> {
    pub fn new(store: TtlCache<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Creates a shared store on the system clock.
    pub fn with_capacity(max_size: usize, default_ttl: u64) -> Self {
        Self::new(TtlCache::new(max_size, default_ttl))
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        self.inner.lock().await.set(key, value, ttl);
    }

    pub async fn has(&self, key: &str) -> bool {
        self.inner.lock().await.has(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.lock().await.delete(key)
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    pub async fn purge_expired(&self) -> usize {
        self.inner.lock().await.purge_expired()
    }

    /// Keys from least to most recently used, expired ones included.
    pub async fn recency_order(&self) -> Vec<String> {
        self.inner.lock().await.recency_order()
    }
}
