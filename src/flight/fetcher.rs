//! Fetcher capability consumed by the coordinator.

use async_trait::async_trait;

/// The expensive lookup a [`Coordinator`](super::Coordinator) protects.
///
/// Implementations decide the transport. The coordinator only needs the
/// namespace that prefixes its cache keys and a way to produce the payload
/// for one key. Errors are handed back to the caller untouched.
#[async_trait]
pub trait Fetcher: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Prefix separating this fetcher's keys from every other fetcher's.
    fn namespace(&self) -> &str;

    /// Produces the payload for `key`.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, Self::Error>;
}

