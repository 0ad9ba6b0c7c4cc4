//! Configuration Module
//!
//! Loads server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::flight::FlightConfig;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Lifetime of a fetched payload
    pub data_ttl: Duration,
    /// Lifetime of an in-flight claim
    pub claim_ttl: Duration,
    /// Delay between checks while waiting on another caller's fetch
    pub poll_interval: Duration,
    /// Longest a caller waits on another caller's fetch
    pub wait_timeout: Duration,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream lookup service
    pub upstream_url: String,
    /// Per-request timeout for upstream calls
    pub upstream_timeout: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unset or unparseable variables fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DATA_TTL_MS` - Payload lifetime (default: 300000)
    /// - `CLAIM_TTL_MS` - Claim lifetime (default: 5000)
    /// - `POLL_INTERVAL_MS` - Waiter poll interval (default: 10)
    /// - `WAIT_TIMEOUT_MS` - Waiter deadline (default: 2000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream base URL (default: http://127.0.0.1:8080)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream request timeout (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            data_ttl: millis_var("DATA_TTL_MS").unwrap_or(defaults.data_ttl),
            claim_ttl: millis_var("CLAIM_TTL_MS").unwrap_or(defaults.claim_ttl),
            poll_interval: millis_var("POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval),
            wait_timeout: millis_var("WAIT_TIMEOUT_MS").unwrap_or(defaults.wait_timeout),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_timeout: millis_var("UPSTREAM_TIMEOUT_MS")
                .unwrap_or(defaults.upstream_timeout),
        }
    }

    /// Rejects combinations the cache and coordinator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::Invalid("MAX_ENTRIES must be at least 1".into()));
        }
        for (name, value) in [
            ("DATA_TTL_MS", self.data_ttl),
            ("CLAIM_TTL_MS", self.claim_ttl),
            ("POLL_INTERVAL_MS", self.poll_interval),
            ("WAIT_TIMEOUT_MS", self.wait_timeout),
            ("UPSTREAM_TIMEOUT_MS", self.upstream_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.poll_interval > self.wait_timeout {
            return Err(ConfigError::Invalid(
                "POLL_INTERVAL_MS must not exceed WAIT_TIMEOUT_MS".into(),
            ));
        }
        Ok(())
    }

    /// Timing knobs handed to the coordinator.
    pub fn flight(&self) -> FlightConfig {
        FlightConfig {
            data_ttl: self.data_ttl,
            claim_ttl: self.claim_ttl,
            poll_interval: self.poll_interval,
            wait_timeout: self.wait_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let flight = FlightConfig::default();
        Self {
            max_entries: 1000,
            data_ttl: flight.data_ttl,
            claim_ttl: flight.claim_ttl,
            poll_interval: flight.poll_interval,
            wait_timeout: flight.wait_timeout,
            server_port: 3000,
            upstream_url: "http://127.0.0.1:8080".to_string(),
            upstream_timeout: Duration::from_secs(5),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn millis_var(name: &str) -> Option<Duration> {
    parse_var::<u64>(name).map(Duration::from_millis)
}
