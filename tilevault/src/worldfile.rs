//! Georeference sidecar (world file) writer.
//!
//! A world file encodes the affine transform from pixel coordinates to
//! ground coordinates for its companion raster: six newline-separated
//! numbers, in order pixel size in x, row rotation, column rotation,
//! pixel size in y (negative for a north-up raster), then the ground
//! coordinates of the upper-left pixel.

use crate::grid::{LevelGeometry, TileCoord};
use crate::naming::{CacheKey, TileFormat};
use std::fs;
use std::io;
use std::path::Path;

/// Renders the six-line world file body for one tile.
///
/// Pixel sizes and corner coordinates carry six fractional digits, which
/// round-trips the tile rectangle at any practical cache resolution;
/// rotations are written as bare `0`.
pub fn world_file_contents(coord: &TileCoord, geometry: &LevelGeometry) -> String {
    let (ulx, uly) = geometry.tile_upper_left(coord.x, coord.y);
    format!(
        "{:.6}\n0\n0\n{:.6}\n{:.6}\n{:.6}\n",
        geometry.resolution, -geometry.resolution, ulx, uly
    )
}

/// Writes (or rewrites) the world file for a tile into `level_dir`.
///
/// Sidecars are cheap to regenerate and are always rewritten, even for
/// tiles that were already materialized by an earlier run, so they stay
/// consistent with the current resolution and origin.
pub fn write_world_file(
    level_dir: &Path,
    coord: &TileCoord,
    format: TileFormat,
    geometry: &LevelGeometry,
) -> io::Result<()> {
    let key = CacheKey::new(coord);
    let path = level_dir.join(key.world_file_name(format));
    fs::write(path, world_file_contents(coord, geometry))
}
