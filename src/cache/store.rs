//! Cache Store Module
//!
//! Main cache engine: an LRU-ordered map of entries with lazy TTL expiration.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};

// == Cache Store ==
/// Fixed-capacity store with LRU eviction and per-entry expiry.
///
/// Not synchronized; wrap it in a [`SharedCache`](crate::cache::SharedCache)
/// to share it between tasks.
#[derive(Debug)]
pub struct CacheStore {
    /// Entries in recency order
    entries: LruCache<String, CacheEntry>,
    /// Usage counters
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::new(),
        }
    }

    // == Add ==
    /// Inserts or overwrites `key`, expiring `ttl` from now.
    ///
    /// Overwriting resets the expiry. Inserting a new key into a full store
    /// evicts the least recently used entry, live or expired. The key becomes
    /// the most recently used either way.
    pub fn add(&mut self, key: String, value: Vec<u8>, ttl: Duration) {
        let replacing = self.entries.contains(&key);
        let entry = CacheEntry::new(value, ttl);

        if let Some((evicted_key, _)) = self.entries.push(key, entry) {
            if !replacing {
                debug!(key = %evicted_key, "evicted least recently used entry");
                self.stats.record_eviction();
            }
        }
    }

    // == Get ==
    /// Returns a copy of the payload for `key` if it is present and live.
    ///
    /// A hit marks the key most recently used. An expired entry found here is
    /// removed before reporting the miss.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired_at(now)).then(|| entry.value.clone()));

        match lookup {
            Some(Some(value)) => {
                self.stats.record_hit();
                Some(value)
            }
            Some(None) => {
                self.entries.pop(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                debug!(key, "dropped expired entry on read");
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Reports whether `key` holds a live entry.
    ///
    /// Unlike [`get`](Self::get) this leaves recency and the hit/miss
    /// counters untouched. An expired entry is still removed.
    pub fn contains(&mut self, key: &str) -> bool {
        let now = Instant::now();
        match self.entries.peek(key).map(|entry| entry.is_expired_at(now)) {
            Some(false) => true,
            Some(true) => {
                self.entries.pop(key);
                self.stats.record_expiration();
                debug!(key, "dropped expired entry on presence check");
                false
            }
            None => false,
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    /// Number of entries physically present, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries held at once.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}
