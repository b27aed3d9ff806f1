//! HTTP client abstraction for testability

use super::types::{FetchError, TileResponse};
use crate::config::DownloadConfig;
use std::future::Future;
use tracing::{trace, warn};

/// Trait for asynchronous tile fetches.
///
/// The engine only ever issues unauthenticated GETs, so the seam is a
/// single method. Implementations must be cheap to clone into spawned
/// tasks; the real client shares its connection pool across clones.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET and returns the body with the
    /// response's declared content type.
    fn get(&self, url: &str) -> impl Future<Output = Result<TileResponse, FetchError>> + Send;
}

/// Real HTTP client backed by reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the default download configuration.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(&DownloadConfig::default())
    }

    /// Creates a client from an explicit download configuration.
    ///
    /// The per-request timeout is finite so a stalled request cannot hold
    /// one of the pool's in-flight slots indefinitely.
    pub fn with_config(config: &DownloadConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs()))
            .user_agent(config.user_agent())
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<TileResponse, FetchError> {
        trace!(url, "tile GET starting");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url, bytes = bytes.len(), "tile body read");
                Ok(TileResponse {
                    bytes: bytes.to_vec(),
                    content_type,
                })
            }
            Err(e) => {
                warn!(url, error = %e, "failed to read tile body");
                Err(FetchError::Transport(e.to_string()))
            }
        }
    }
}
