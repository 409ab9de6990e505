//! Inbound fetch capability.
//!
//! [`RemoteFetch`] opens a remote resource and hands back its declared size
//! and a stream of body chunks. [`HttpFetcher`] is the reqwest-backed
//! implementation used in production.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::Client;
use reqwest::header::CONTENT_LENGTH;
use tracing::{debug, instrument};
use url::Url;

use super::error::TransferError;
use crate::config::FetchTimeouts;

/// An opened remote resource.
pub struct RemoteBody {
    /// Size declared by the remote side, if present and parseable.
    pub content_length: Option<u64>,
    /// Body chunks in arrival order. Chunk sizes are arbitrary.
    pub chunks: BoxStream<'static, Result<Bytes, TransferError>>,
}

impl std::fmt::Debug for RemoteBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Opens remote resources for streaming.
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    /// Sends the request and returns the body once a success status arrived.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::RemoteStatus`] for non-2xx responses and
    /// [`TransferError::Timeout`] / [`TransferError::Network`] for transport failures.
    async fn open(&self, url: &Url) -> Result<RemoteBody, TransferError>;
}

/// HTTP fetcher with its own timeout policy.
///
/// Create once and share; the inner client pools connections.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher using the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialized.
    pub fn new(timeouts: &FetchTimeouts) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.total)
            .read_timeout(timeouts.read)
            .user_agent(concat!("linkrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteFetch for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn open(&self, url: &Url) -> Result<RemoteBody, TransferError> {
        let url_text = url.to_string();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransferError::from_reqwest(&url_text, &e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "remote returned error status");
            return Err(TransferError::remote_status(url_text, status.as_u16()));
        }

        let content_length = declared_content_length(&response);
        debug!(?content_length, "remote stream opened");

        let chunks = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| TransferError::from_reqwest(&url_text, &e)))
            .boxed();

        Ok(RemoteBody {
            content_length,
            chunks,
        })
    }
}

/// Reads the Content-Length header; unparseable values count as absent.
fn declared_content_length(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn collect(body: RemoteBody) -> Result<Vec<u8>, TransferError> {
        let mut out = Vec::new();
        let mut chunks = body.chunks;
        while let Some(chunk) = chunks.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn test_open_returns_declared_length_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archive.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchTimeouts::default()).unwrap();
        let url = Url::parse(&format!("{}/archive.zip", server.uri())).unwrap();
        let body = fetcher.open(&url).await.unwrap();

        assert_eq!(body.content_length, Some(4096));
        assert_eq!(collect(body).await.unwrap(), vec![7u8; 4096]);
    }

    #[tokio::test]
    async fn test_open_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchTimeouts::default()).unwrap();
        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let result = fetcher.open(&url).await;

        match result {
            Err(TransferError::RemoteStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected RemoteStatus, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_open_maps_slow_response_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"late".to_vec())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let timeouts = FetchTimeouts {
            connect: Duration::from_secs(5),
            total: Duration::from_millis(300),
            read: Duration::from_millis(300),
        };
        let fetcher = HttpFetcher::new(&timeouts).unwrap();
        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
        let result = fetcher.open(&url).await;

        assert!(
            matches!(result, Err(TransferError::Timeout { .. })),
            "Expected Timeout, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn test_open_maps_refused_connection_to_network_error() {
        // Bind then drop to get a port with no listener.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let fetcher = HttpFetcher::new(&FetchTimeouts::default()).unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/file.bin")).unwrap();
        let result = fetcher.open(&url).await;

        assert!(
            matches!(result, Err(TransferError::Network { .. })),
            "Expected Network, got: {result:?}"
        );
    }
}
