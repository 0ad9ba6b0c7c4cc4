//! Flight Cache - A single-flight lookup cache
//!
//! An LRU cache with per-entry expiry, plus a claim/poll coordinator that
//! collapses concurrent misses on the same key into one upstream fetch.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod models;
pub mod upstream;

pub use api::AppState;
pub use cache::SharedCache;
pub use config::Config;
pub use flight::{Coordinator, Fetcher, FlightConfig, Outcome};
