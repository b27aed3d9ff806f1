//! Vendor cache naming convention.
//!
//! The exploded cache layout addresses every tile by a `{L, R, C}` triple:
//! level as `L` plus two decimal digits, row and column as `R`/`C` plus
//! eight uppercase hex digits. This mapping is the on-disk contract shared
//! with existing cache-consuming tools and must be reproduced bit-exact.

use crate::grid::TileCoord;

/// Directory name for the cache tree under the destination root.
pub const ALL_LAYERS_DIR: &str = "_alllayers";

/// Persisted raster format of a tile image.
///
/// The cache stores exactly these two kinds. The format is decided once,
/// from the fetch response's declared content type, and read back from the
/// file extension only to detect prior completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileFormat {
    Png,
    Jpeg,
}

impl TileFormat {
    /// Probe order for detecting an already-materialized tile on disk.
    pub const PROBE_ORDER: [TileFormat; 2] = [TileFormat::Png, TileFormat::Jpeg];

    /// Maps a response's declared content type to a format.
    ///
    /// `image/png` selects PNG; anything else, including an absent or
    /// unrecognized content type, falls back to JPEG.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.split(';').next().unwrap_or("").trim() == "image/png" => {
                TileFormat::Png
            }
            _ => TileFormat::Jpeg,
        }
    }

    /// Image file extension, without the dot.
    pub fn image_extension(&self) -> &'static str {
        match self {
            TileFormat::Png => "png",
            TileFormat::Jpeg => "jpeg",
        }
    }

    /// World-file extension paired to the image format, without the dot.
    pub fn world_extension(&self) -> &'static str {
        match self {
            TileFormat::Png => "pgw",
            TileFormat::Jpeg => "jgw",
        }
    }
}

/// Derived cache naming triple for one tile coordinate.
///
/// Never stored; always recomputed from a [`TileCoord`]. Row and column
/// are encoded as exactly eight uppercase hex digits, unsigned,
/// most-significant digit first. Indices outside `0..2^32` are a fixed
/// limitation of the naming scheme: they are truncated to their low 32
/// bits (two's complement for negatives) and will not round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    level: String,
    row: String,
    col: String,
}

impl CacheKey {
    pub fn new(coord: &TileCoord) -> Self {
        Self {
            level: format!("L{:02}", coord.level),
            row: format!("R{:08X}", coord.y as u32),
            col: format!("C{:08X}", coord.x as u32),
        }
    }

    /// Level directory name, e.g. `L03`.
    pub fn level_dir(&self) -> &str {
        &self.level
    }

    /// Row component, e.g. `R000000FF`.
    pub fn row(&self) -> &str {
        &self.row
    }

    /// Column component, e.g. `C0000000A`.
    pub fn col(&self) -> &str {
        &self.col
    }

    /// File stem shared by the tile image and its world file, e.g.
    /// `R000000FFC0000000A`.
    pub fn file_stem(&self) -> String {
        format!("{}{}", self.row, self.col)
    }

    /// Image file name for the given format.
    pub fn image_file_name(&self, format: TileFormat) -> String {
        format!("{}.{}", self.file_stem(), format.image_extension())
    }

    /// World file name paired to the given format.
    pub fn world_file_name(&self, format: TileFormat) -> String {
        format!("{}.{}", self.file_stem(), format.world_extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(level: u32, x: i64, y: i64) -> CacheKey {
        CacheKey::new(&TileCoord { level, x, y })
    }

    #[test]
    fn test_components_match_vendor_convention() {
        let k = key(3, 10, 255);
        assert_eq!(k.level_dir(), "L03");
        assert_eq!(k.row(), "R000000FF");
        assert_eq!(k.col(), "C0000000A");
    }

    #[test]
    fn test_component_widths_are_fixed() {
        let k = key(0, 0, 0);
        assert_eq!(k.level_dir().len(), 3);
        assert_eq!(k.row().len(), 9);
        assert_eq!(k.col().len(), 9);
        assert_eq!(k.row(), "R00000000");
    }

    #[test]
    fn test_hex_is_uppercase() {
        let k = key(12, 0xabcdef, 0xfedcba);
        assert_eq!(k.col(), "C00ABCDEF");
        assert_eq!(k.row(), "R00FEDCBA");
    }

    #[test]
    fn test_two_digit_level_padding() {
        assert_eq!(key(7, 0, 0).level_dir(), "L07");
        assert_eq!(key(14, 0, 0).level_dir(), "L14");
    }

    #[test]
    fn test_deterministic_and_injective_over_practical_indices() {
        let a = key(5, 17, 34);
        let b = key(5, 17, 34);
        assert_eq!(a, b);

        let mut seen = std::collections::HashSet::new();
        for x in 0..16 {
            for y in 0..16 {
                assert!(seen.insert(key(2, x, y).file_stem()));
            }
        }
    }

    #[test]
    fn test_file_names_pair_by_format() {
        let k = key(3, 10, 255);
        assert_eq!(k.image_file_name(TileFormat::Png), "R000000FFC0000000A.png");
        assert_eq!(k.world_file_name(TileFormat::Png), "R000000FFC0000000A.pgw");
        assert_eq!(
            k.image_file_name(TileFormat::Jpeg),
            "R000000FFC0000000A.jpeg"
        );
        assert_eq!(
            k.world_file_name(TileFormat::Jpeg),
            "R000000FFC0000000A.jgw"
        );
    }

    #[test]
    fn test_format_from_content_type() {
        assert_eq!(
            TileFormat::from_content_type(Some("image/png")),
            TileFormat::Png
        );
        assert_eq!(
            TileFormat::from_content_type(Some("image/png; charset=binary")),
            TileFormat::Png
        );
        assert_eq!(
            TileFormat::from_content_type(Some("image/jpeg")),
            TileFormat::Jpeg
        );
        // Unrecognized and absent content types fall back to JPEG.
        assert_eq!(
            TileFormat::from_content_type(Some("application/octet-stream")),
            TileFormat::Jpeg
        );
        assert_eq!(TileFormat::from_content_type(None), TileFormat::Jpeg);
    }
}
