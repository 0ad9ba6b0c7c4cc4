//! Shared Cache Handle
//!
//! The process-wide cache instance, cloned into every consumer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::{CacheStats, CacheStore};

// == Shared Cache ==
/// Cloneable handle to one [`CacheStore`] behind a single mutex.
///
/// Every clone refers to the same store. Lock hold times cover map work
/// only, never I/O.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<CacheStore>>,
}

impl SharedCache {
    /// Creates a new shared store with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self::from_store(CacheStore::new(capacity))
    }

    /// Wraps an existing store.
    pub fn from_store(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Inserts or overwrites `key` with a payload expiring after `ttl`.
    pub async fn add(&self, key: impl Into<String>, value: Vec<u8>, ttl: Duration) {
        self.inner.lock().await.add(key.into(), value, ttl);
    }

    /// Returns a copy of the live payload stored under `key`.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().await.get(key)
    }

    /// Whether `key` holds a live entry, without counting it as a read.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.contains(key)
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn capacity(&self) -> usize {
        self.inner.lock().await.capacity()
    }
}
