//! Tile grid type definitions

use std::fmt;

/// Tile coordinates within one level of the pyramid.
///
/// `x` grows eastward, `y` grows southward: the grid origin sits at the
/// pyramid's top-left corner, matching the vendor cache convention.
/// Indices are signed because an extent reaching west or north of the
/// grid origin maps to negative indices; those tiles do not exist on the
/// server and fail per-tile at fetch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Level of detail this coordinate belongs to.
    pub level: u32,
    /// Column index (east-west), 0 at the grid origin.
    pub x: i64,
    /// Row index (north-south), 0 at the grid origin.
    pub y: i64,
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}/{}/{}", self.level, self.y, self.x)
    }
}

/// Ground-space geometry of one pyramid level.
///
/// Bundles the three values every per-tile computation needs: the level's
/// resolution (ground units per pixel), the grid origin, and the tile edge
/// length in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelGeometry {
    /// Ground units per pixel at this level.
    pub resolution: f64,
    /// Grid origin (top-left corner) in the pyramid's coordinate system.
    pub origin: GridOrigin,
    /// Tile edge length in pixels.
    pub tile_size: u32,
}

impl LevelGeometry {
    /// Width of one tile in ground units.
    #[inline]
    pub fn tile_ground_width(&self) -> f64 {
        self.resolution * self.tile_size as f64
    }

    /// Ground coordinate of a tile's upper-left corner.
    #[inline]
    pub fn tile_upper_left(&self, x: i64, y: i64) -> (f64, f64) {
        let w = self.tile_ground_width();
        (
            self.origin.x + x as f64 * w,
            self.origin.y - y as f64 * w,
        )
    }
}

/// Grid origin point in the pyramid's coordinate system.
///
/// This is the top-left corner of tile (0, 0) at every level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOrigin {
    pub x: f64,
    pub y: f64,
}

/// Inclusive tile-index rectangle for one level.
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y` for any well-formed
/// extent; a degenerate single-tile range is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl TileRange {
    /// Number of tiles in the rectangle, `(max_x-min_x+1)*(max_y-min_y+1)`.
    pub fn tile_count(&self) -> u64 {
        let cols = (self.max_x - self.min_x + 1) as u64;
        let rows = (self.max_y - self.min_y + 1) as u64;
        cols * rows
    }

    /// Iterates every coordinate in the rectangle, both ends inclusive.
    ///
    /// Tiles are yielded row-major: row `min_y` west to east first.
    pub fn coords(&self, level: u32) -> impl Iterator<Item = TileCoord> + '_ {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..=self.max_y)
            .flat_map(move |y| (min_x..=max_x).map(move |x| TileCoord { level, x, y }))
    }
}

impl fmt::Display for TileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cols {}..={}, rows {}..={}",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}
