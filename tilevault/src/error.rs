//! Fatal error taxonomy for a materialization run.
//!
//! Only two classes abort a run, both before any tile work: a missing
//! directory-write capability and a spatial-reference mismatch between
//! the pyramid and the extent. Everything else (per-tile network and
//! filesystem failures) is logged where it happens and never surfaces as
//! an overall failure.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::pyramid::SpatialReference;

/// Errors that abort a run before any tile is touched.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The destination tree could not be created or written.
    #[error("destination is not writable: {path}: {source}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Pyramid and extent disagree on the coordinate reference system.
    #[error("spatial reference mismatch: pyramid is {pyramid}, extent is {extent}")]
    SpatialReferenceMismatch {
        pyramid: SpatialReference,
        extent: SpatialReference,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display_names_both_systems() {
        let err = EngineError::SpatialReferenceMismatch {
            pyramid: SpatialReference::new(3857),
            extent: SpatialReference::new(25832),
        };
        let msg = err.to_string();
        assert!(msg.contains("EPSG:3857"));
        assert!(msg.contains("EPSG:25832"));
    }
}
