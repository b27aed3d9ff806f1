//! Fetch types and errors

use thiserror::Error;

/// One successful tile response: the body plus the server's declared
/// content type, which downstream code maps to a persisted format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileResponse {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Errors from a single tile fetch.
///
/// Variants carry rendered strings rather than source errors so responses
/// stay cheap to clone into test doubles; every fetch failure is local to
/// its tile anyway and only ever logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Request never produced a response (connect failure, timeout, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_names_url() {
        let err = FetchError::Status {
            status: 404,
            url: "http://example.com/tile/2/5/5".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from http://example.com/tile/2/5/5");
    }

    #[test]
    fn test_transport_display() {
        let err = FetchError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "request failed: connection refused");
    }
}
