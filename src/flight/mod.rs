//! Flight Module
//!
//! Single-flight coordination on top of the shared cache: one caller fetches
//! a missing key while concurrent callers wait for its result.

mod coordinator;
mod fetcher;
mod stats;

pub use coordinator::{claim_key, data_key, Coordinator, FlightConfig, Outcome};
pub use fetcher::Fetcher;
pub use stats::{FlightStats, FlightStatsSnapshot};
