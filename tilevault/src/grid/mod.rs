//! Tile grid geometry
//!
//! Pure conversions between ground coordinates and tile indices for a
//! georeferenced tile pyramid: given the grid origin, the tile pixel size
//! and a level's resolution, maps a ground extent to the inclusive
//! rectangle of tile indices covering it.

mod types;

pub use types::{GridOrigin, LevelGeometry, TileCoord, TileRange};

use crate::pyramid::Extent;

/// Computes the inclusive tile-index rectangle covering `extent`.
///
/// A tile spans `resolution * tile_size` ground units per edge. Columns
/// count eastward from the origin, rows count southward (the vertical
/// axis is mirrored relative to ground coordinates):
///
/// - column for ground x: `floor((x - origin.x) / tile_width)`
/// - row for ground y: `floor((origin.y - y) / tile_width)`
///
/// No clamping against the server's actual coverage is performed; indices
/// outside it (including negative ones) are expected to fail per-tile at
/// fetch time, not here. Total and deterministic for any finite extent
/// and positive resolution.
pub fn range_covering(extent: &Extent, geometry: &LevelGeometry) -> TileRange {
    let w = geometry.tile_ground_width();
    let origin = geometry.origin;

    TileRange {
        min_x: ((extent.xmin - origin.x) / w).floor() as i64,
        max_x: ((extent.xmax - origin.x) / w).floor() as i64,
        min_y: ((origin.y - extent.ymax) / w).floor() as i64,
        max_y: ((origin.y - extent.ymin) / w).floor() as i64,
    }
}
