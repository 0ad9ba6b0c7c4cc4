//! Response models for the lookup server API
//!
//! Payloads from `/lookup` are returned as raw bytes; only the JSON
//! endpoints need DTOs.

pub mod responses;

pub use responses::{HealthResponse, StatsResponse};
