//! HTTP Fetcher
//!
//! Resolves keys against an upstream lookup service over HTTP.

use async_trait::async_trait;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use crate::flight::Fetcher;

/// Errors from talking to the upstream lookup service.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The configured base URL cannot carry path segments
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),

    /// The request could not be sent or its body could not be read
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

// == HTTP Fetcher ==
/// [`Fetcher`] issuing `GET {base_url}/{namespace}/{key}`.
///
/// Any 2xx body is the payload. Every other status is an error, so nothing
/// but successful answers ever reaches the cache.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    namespace: String,
}

impl HttpFetcher {
    pub fn new(
        client: Client,
        base_url: &str,
        namespace: impl Into<String>,
    ) -> Result<Self, UpstreamError> {
        let base_url =
            Url::parse(base_url).map_err(|err| UpstreamError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url,
            namespace: namespace.into(),
        })
    }

    /// URL queried for `key`, with both path segments percent-encoded.
    pub fn url_for(&self, key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.namespace).push(key);
        }
        url
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    type Error = UpstreamError;

    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>, UpstreamError> {
        let url = self.url_for(key);
        debug!(%url, "fetching from upstream");

        let transport = |source: reqwest::Error| UpstreamError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::Path, http::StatusCode, routing::get, Router};

    /// Serves `/apikey/:key` on an ephemeral port; key "missing" yields 404.
    async fn spawn_upstream(hits: Arc<AtomicUsize>) -> SocketAddr {
        let app = Router::new().route(
            "/apikey/:key",
            get(move |Path(key): Path<String>| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    if key == "missing" {
                        Err(StatusCode::NOT_FOUND)
                    } else {
                        Ok(format!("project-for-{key}"))
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[test]
    fn test_url_for_encodes_segments() {
        let fetcher = HttpFetcher::new(Client::new(), "http://upstream.local/v1/", "apikey").unwrap();

        assert_eq!(
            fetcher.url_for("abc").as_str(),
            "http://upstream.local/v1/apikey/abc"
        );
        assert_eq!(
            fetcher.url_for("a/b c").as_str(),
            "http://upstream.local/v1/apikey/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(matches!(
            HttpFetcher::new(Client::new(), "not a url", "apikey"),
            Err(UpstreamError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpFetcher::new(Client::new(), "mailto:ops@example.com", "apikey"),
            Err(UpstreamError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let hits = Arc::new(AtomicUsize::new(0));
        let addr = spawn_upstream(hits.clone()).await;
        let fetcher = HttpFetcher::new(Client::new(), &format!("http://{addr}"), "apikey").unwrap();

        let body = fetcher.fetch("key-1").await.unwrap();

        assert_eq!(body, b"project-for-key-1");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let hits = Arc::new(AtomicUsize::new(0));
        let addr = spawn_upstream(hits).await;
        let fetcher = HttpFetcher::new(Client::new(), &format!("http://{addr}"), "apikey").unwrap();

        let err = fetcher.fetch("missing").await.unwrap_err();

        assert!(matches!(err, UpstreamError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_maps_connection_failure() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(Client::new(), &format!("http://{addr}"), "apikey").unwrap();
        let err = fetcher.fetch("key-1").await.unwrap_err();

        assert!(matches!(err, UpstreamError::Transport { .. }));
    }
}
