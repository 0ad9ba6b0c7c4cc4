//! Response DTOs for the lookup server API
//!
//! Defines the structure of outgoing JSON response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::flight::FlightStatsSnapshot;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Maximum number of cache entries
    pub capacity: usize,
    /// Cache-level counters
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses)) of raw cache reads
    pub hit_rate: f64,
    /// How lookups were satisfied
    pub lookups: FlightStatsSnapshot,
}

impl StatsResponse {
    pub fn new(capacity: usize, cache: CacheStats, lookups: FlightStatsSnapshot) -> Self {
        Self {
            capacity,
            hit_rate: cache.hit_rate(),
            cache,
            lookups,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
