//! Tilevault - tile-cache materialization engine
//!
//! Given a georeferenced tile pyramid description and a target extent,
//! tilevault computes the tiles covering the extent at every level,
//! fetches each exactly once into the vendor's exploded cache layout,
//! writes a georeference sidecar next to every tile, and emits a
//! per-level GDAL conversion script.
//!
//! # High-Level API
//!
//! ```ignore
//! use tilevault::fetch::ReqwestClient;
//! use tilevault::orchestrator::Engine;
//! use tilevault::pyramid;
//!
//! let (descriptor, full_extent) =
//!     pyramid::from_service_json(&document, "https://host/service/tile")?;
//! let extent = full_extent.expect("service declares an extent");
//!
//! let engine = Engine::new(ReqwestClient::new()?);
//! let summary = engine.run(&descriptor, &extent, dest_dir).await?;
//! ```
//!
//! Re-running over the same destination is cheap and safe: tiles already
//! on disk are skipped without network access.

pub mod config;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod logging;
pub mod materialize;
pub mod naming;
pub mod orchestrator;
pub mod progress;
pub mod pyramid;
pub mod script;
pub mod worldfile;

/// Version of the tilevault library and CLI.
///
/// Synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
