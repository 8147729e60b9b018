//! Remote fetch boundary
//!
//! Manifests and code artifacts are opaque blobs fetched by URL. `http` and
//! `https` go through `reqwest`; `file` URLs are read from disk, which is
//! how local compositions and tests serve fragments.

use futures_util::future::BoxFuture;
use reqwest::Url;
use thiserror::Error;
use tracing::debug;

/// Why a fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { scheme: String, url: String },
}

/// Fetches remote blobs
pub trait RemoteFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Vec<u8>, FetchError>>;
}

/// Fetcher for `http`, `https` and `file` URLs
///
/// No timeout is imposed beyond the client's own.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_http(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response =
            self.client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| FetchError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(body.to_vec())
    }

    async fn fetch_file(url: &Url) -> Result<Vec<u8>, FetchError> {
        let path = url.to_file_path().map_err(|()| FetchError::Io {
            path: url.to_string(),
            reason: "not a local file path".to_string(),
        })?;
        tokio::fs::read(&path).await.map_err(|e| FetchError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        Box::pin(async move {
            debug!(%url, "fetching");
            match url.scheme() {
                "http" | "https" => self.fetch_http(url).await,
                "file" => Self::fetch_file(url).await,
                scheme => Err(FetchError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    url: url.to_string(),
                }),
            }
        })
    }
}
