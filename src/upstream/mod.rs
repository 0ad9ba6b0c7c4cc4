//! Upstream Module
//!
//! Concrete fetchers for the lookups the server protects.

mod http;

pub use http::{HttpFetcher, UpstreamError};

/// Namespace resolving an API key to its environment and project.
pub const API_KEY_NAMESPACE: &str = "apikey";

/// Namespace resolving an environment id to its resource descriptor.
pub const RESOURCE_NAMESPACE: &str = "resource";
