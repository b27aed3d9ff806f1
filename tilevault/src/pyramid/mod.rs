//! Pyramid descriptor and extent model.
//!
//! [`PyramidDescriptor`] is the validated, immutable description of a
//! tile pyramid (levels, resolutions, origin, tile size, base URL,
//! spatial reference); [`Extent`] is the area of interest in the same
//! coordinate system. Both are loaded once and read-only for a run.

mod document;
mod types;

pub use document::from_service_json;
pub use types::{
    Extent, LevelOfDetail, PyramidDescriptor, PyramidError, SpatialReference,
};
