//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an absolute expiry.

use std::time::Duration;

use tokio::time::Instant;

/// Lifetime used when `now + ttl` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

// == Cache Entry ==
/// A stored payload and the instant at which it stops being readable.
///
/// The payload is opaque to the cache. Readers always receive a clone.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Vec<u8>,
    /// Absolute expiration instant, fixed at insertion
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl` from now.
    pub fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self::new_at(value, ttl, Instant::now())
    }

    /// Creates an entry expiring `ttl` after `now`.
    ///
    /// A TTL too large to add to `now` is clamped to roughly thirty years.
    pub fn new_at(value: Vec<u8>, ttl: Duration, now: Instant) -> Self {
        let expires_at = now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE);
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// An entry is dead once `now >= expires_at`, so a zero TTL produces an
    /// entry that is never readable.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
