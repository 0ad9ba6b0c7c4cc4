//! API Handlers
//!
//! HTTP request handlers for each lookup server endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderName},
    response::IntoResponse,
    Json,
};
use reqwest::Client;

use crate::cache::SharedCache;
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::flight::{Coordinator, Fetcher};
use crate::models::{HealthResponse, StatsResponse};
use crate::upstream::{HttpFetcher, UpstreamError, API_KEY_NAMESPACE, RESOURCE_NAMESPACE};

/// Maximum accepted key length in bytes.
pub const MAX_KEY_LENGTH: usize = 256;

/// Response header naming how a lookup was satisfied.
pub const OUTCOME_HEADER: HeaderName = HeaderName::from_static("x-cache-outcome");

/// Fetcher type the server registers per namespace.
pub type DynFetcher = Arc<dyn Fetcher<Error = UpstreamError>>;

/// Application state shared across all handlers.
///
/// Holds the one coordinator for the process and the fetchers it fronts,
/// keyed by namespace.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Coordinator,
    fetchers: Arc<HashMap<String, DynFetcher>>,
}

impl AppState {
    /// Creates a state with no fetchers registered.
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            fetchers: Arc::new(HashMap::new()),
        }
    }

    /// Registers `fetcher` under its own namespace, replacing any previous one.
    pub fn with_fetcher(mut self, fetcher: DynFetcher) -> Self {
        let namespace = fetcher.namespace().to_string();
        Arc::make_mut(&mut self.fetchers).insert(namespace, fetcher);
        self
    }

    /// Builds the cache, coordinator and HTTP fetchers described by `config`.
    pub fn from_config(config: &Config) -> std::result::Result<Self, UpstreamError> {
        let cache = SharedCache::new(config.max_entries);
        let coordinator = Coordinator::new(cache, config.flight());

        let client = Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|source| UpstreamError::Transport {
                url: config.upstream_url.clone(),
                source,
            })?;

        let mut state = Self::new(coordinator);
        for namespace in [API_KEY_NAMESPACE, RESOURCE_NAMESPACE] {
            let fetcher = HttpFetcher::new(client.clone(), &config.upstream_url, namespace)?;
            state = state.with_fetcher(Arc::new(fetcher));
        }
        Ok(state)
    }

    pub fn fetcher(&self, namespace: &str) -> Option<&DynFetcher> {
        self.fetchers.get(namespace)
    }

    /// Registered namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self.fetchers.keys().map(String::as_str).collect();
        namespaces.sort_unstable();
        namespaces
    }
}

/// Handler for GET /lookup/:namespace/:key
///
/// Resolves a key through the coordinator and returns the raw payload.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(ServiceError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }

    let fetcher = state
        .fetcher(&namespace)
        .ok_or_else(|| ServiceError::UnknownNamespace(namespace.clone()))?;

    let (value, outcome) = state
        .coordinator
        .lookup_traced(fetcher.as_ref(), &key)
        .await
        .map_err(|err| ServiceError::UpstreamUnavailable(err.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream"),
            (OUTCOME_HEADER, outcome.as_str()),
        ],
        value,
    ))
}

/// Handler for GET /stats
///
/// Returns cache and lookup statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.coordinator.cache();
    Json(StatsResponse::new(
        cache.capacity().await,
        cache.stats().await,
        state.coordinator.stats(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
