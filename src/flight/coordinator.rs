//! Stampede-Avoidance Coordinator
//!
//! Collapses concurrent misses on one key into a single upstream fetch.
//!
//! For a logical key the coordinator uses two independent cache slots: the
//! data slot holding the payload and a claim slot whose presence means a
//! fetch is in flight. Slot keys carry a kind tag, so no key of either kind
//! can name a slot of the other. Callers read the slots and act as follows:
//!
//! - data present: return it.
//! - claim absent: write the claim, fetch, store the result.
//! - claim present: poll the data slot until it fills or the caller's own
//!   deadline passes, then fetch locally without writing a new claim.
//!
//! Claim-then-fetch is not atomic, so two callers can both claim and both
//! fetch. That only costs a duplicate call.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{FlightStats, FlightStatsSnapshot, Fetcher};
use crate::cache::SharedCache;

/// Payload stored in claim slots.
const CLAIM_MARKER: &[u8] = b"in-flight";

/// Key tag of data slots.
const DATA_TAG: &str = "d";

/// Key tag of claim slots.
const CLAIM_TAG: &str = "c";

/// Floor applied to the poll interval so a waiter always yields.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// == Flight Config ==
/// Timing knobs for the claim/poll protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightConfig {
    /// Lifetime of a fetched payload
    pub data_ttl: Duration,
    /// Lifetime of a claim, bounding how long a stalled fetch holds off others
    pub claim_ttl: Duration,
    /// Delay between data-slot checks while waiting
    pub poll_interval: Duration,
    /// Longest a single waiter waits before fetching itself
    pub wait_timeout: Duration,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            data_ttl: Duration::from_secs(300),
            claim_ttl: Duration::from_secs(5),
            poll_interval: Duration::from_millis(10),
            wait_timeout: Duration::from_secs(2),
        }
    }
}

// == Outcome ==
/// How a lookup obtained its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The data slot was already populated
    Hit,
    /// This caller claimed the key and fetched it
    Fetched,
    /// This caller waited and read the claimant's result
    Coalesced,
    /// This caller waited, timed out and fetched on its own
    FallbackFetched,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Hit => "hit",
            Outcome::Fetched => "fetched",
            Outcome::Coalesced => "coalesced",
            Outcome::FallbackFetched => "fallback",
        }
    }
}

// == Coordinator ==
/// Single-flight front for any number of [`Fetcher`]s over one cache.
///
/// Cheap to clone; clones share the cache and the counters.
#[derive(Debug, Clone)]
pub struct Coordinator {
    cache: SharedCache,
    config: FlightConfig,
    stats: Arc<FlightStats>,
}

impl Coordinator {
    pub fn new(cache: SharedCache, config: FlightConfig) -> Self {
        Self {
            cache,
            config,
            stats: Arc::new(FlightStats::new()),
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn stats(&self) -> FlightStatsSnapshot {
        self.stats.snapshot()
    }

    // == Lookup ==
    /// Returns the payload for `key`, fetching it through `fetcher` at most
    /// once across concurrent callers where timing allows.
    ///
    /// Fetch errors are returned as-is and leave the data slot empty.
    pub async fn lookup<F>(&self, fetcher: &F, key: &str) -> Result<Vec<u8>, F::Error>
    where
        F: Fetcher + ?Sized,
    {
        self.lookup_traced(fetcher, key)
            .await
            .map(|(value, _)| value)
    }

    /// Like [`lookup`](Self::lookup), also reporting how the payload was
    /// obtained.
    pub async fn lookup_traced<F>(
        &self,
        fetcher: &F,
        key: &str,
    ) -> Result<(Vec<u8>, Outcome), F::Error>
    where
        F: Fetcher + ?Sized,
    {
        let namespace = fetcher.namespace();
        let data_key = data_key(namespace, key);
        let claim_key = claim_key(namespace, key);
        let result = self.resolve(fetcher, key, &data_key, claim_key).await;

        match &result {
            Ok((_, outcome)) => {
                debug!(key = %data_key, outcome = outcome.as_str(), "lookup resolved");
                self.stats.record(*outcome);
            }
            Err(err) => {
                warn!(key = %data_key, error = %err, "upstream fetch failed");
                self.stats.record_fetch_error();
            }
        }

        result
    }

    async fn resolve<F>(
        &self,
        fetcher: &F,
        key: &str,
        data_key: &str,
        claim_key: String,
    ) -> Result<(Vec<u8>, Outcome), F::Error>
    where
        F: Fetcher + ?Sized,
    {
        if let Some(value) = self.cache.get(data_key).await {
            return Ok((value, Outcome::Hit));
        }

        // Claim checks stay out of the hit/miss counters
        if !self.cache.contains(&claim_key).await {
            self.cache
                .add(claim_key, CLAIM_MARKER.to_vec(), self.config.claim_ttl)
                .await;
            let value = self.fetch_and_store(fetcher, key, data_key).await?;
            return Ok((value, Outcome::Fetched));
        }

        match self.wait_for(data_key).await {
            Some(value) => Ok((value, Outcome::Coalesced)),
            None => {
                warn!(
                    key = %data_key,
                    waited = ?self.config.wait_timeout,
                    "claim wait timed out, fetching locally"
                );
                let value = self.fetch_and_store(fetcher, key, data_key).await?;
                Ok((value, Outcome::FallbackFetched))
            }
        }
    }

    async fn fetch_and_store<F>(
        &self,
        fetcher: &F,
        key: &str,
        data_key: &str,
    ) -> Result<Vec<u8>, F::Error>
    where
        F: Fetcher + ?Sized,
    {
        let value = fetcher.fetch(key).await?;
        self.cache
            .add(data_key, value.clone(), self.config.data_ttl)
            .await;
        Ok(value)
    }

    /// Polls the data slot until it fills or this call's deadline passes.
    async fn wait_for(&self, data_key: &str) -> Option<Vec<u8>> {
        let interval = self.config.poll_interval.max(MIN_POLL_INTERVAL);
        let poll = async {
            loop {
                tokio::time::sleep(interval).await;
                if let Some(value) = self.cache.get(data_key).await {
                    return value;
                }
            }
        };

        tokio::time::timeout(self.config.wait_timeout, poll)
            .await
            .ok()
    }
}

// == Key Helpers ==
/// Cache key of the data slot for `key` under `namespace`.
pub fn data_key(namespace: &str, key: &str) -> String {
    slot_key(DATA_TAG, namespace, key)
}

/// Cache key of the claim slot for `key` under `namespace`.
pub fn claim_key(namespace: &str, key: &str) -> String {
    slot_key(CLAIM_TAG, namespace, key)
}

fn slot_key(tag: &str, namespace: &str, key: &str) -> String {
    if namespace.is_empty() {
        format!("{tag}:{key}")
    } else {
        format!("{tag}:{namespace}:{key}")
    }
}
