//! CLI error type.

use std::io;
use thiserror::Error;
use tilevault::error::EngineError;
use tilevault::fetch::FetchError;
use tilevault::pyramid::PyramidError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read service document: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Pyramid(#[from] PyramidError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Http(#[from] FetchError),

    #[error("{0}")]
    Usage(String),
}
