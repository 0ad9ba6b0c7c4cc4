//! API Module
//!
//! HTTP handlers and routing for the lookup server.
//!
//! # Endpoints
//! - `GET /lookup/:namespace/:key` - Resolve a key, fetching upstream at most once per burst
//! - `GET /stats` - Get cache and lookup statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
