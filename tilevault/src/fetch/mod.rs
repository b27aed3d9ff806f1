//! Tile fetching over HTTP.
//!
//! The engine issues one unauthenticated GET per tile against
//! `{base_url}/{level}/{row}/{col}`. The [`AsyncHttpClient`] trait keeps
//! the network edge injectable so the materializer and orchestrator are
//! testable against a mock.

mod http;
mod types;

pub use http::{AsyncHttpClient, ReqwestClient};
pub use types::{FetchError, TileResponse};

#[cfg(test)]
pub use http::tests::MockHttpClient;
