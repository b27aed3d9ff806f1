//! Pyramid descriptor types

use std::fmt;
use thiserror::Error;

use crate::grid::{GridOrigin, LevelGeometry};

/// Errors raised while loading or validating a pyramid descriptor.
#[derive(Debug, Error)]
pub enum PyramidError {
    /// Descriptor document could not be parsed.
    #[error("malformed service document: {0}")]
    Document(#[from] serde_json::Error),

    /// Descriptor declares no levels of detail.
    #[error("pyramid declares no levels of detail")]
    NoLevels,

    /// A level's resolution or scale is not a positive finite number.
    #[error("level {level} has non-positive resolution or scale")]
    BadLevel { level: u32 },

    /// Tiles are not square; the cache convention assumes one edge length.
    #[error("tile size {width}x{height} is not square")]
    NonSquareTiles { width: u32, height: u32 },

    /// Extent bounds are inverted or not finite.
    #[error("invalid extent: ({xmin}, {ymin}) .. ({xmax}, {ymax})")]
    InvalidExtent {
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    },
}

/// Well-known identifier of a coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpatialReference(u32);

impl SpatialReference {
    pub fn new(wkid: u32) -> Self {
        Self(wkid)
    }

    pub fn wkid(&self) -> u32 {
        self.0
    }

    /// Identifier string in the form GDAL understands, e.g. `EPSG:3857`.
    pub fn epsg_code(&self) -> String {
        format!("EPSG:{}", self.0)
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// One zoom level of the pyramid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelOfDetail {
    /// Level number as named in cache paths.
    pub level: u32,
    /// Ground units per pixel at this level.
    pub resolution: f64,
    /// Cartographic scale denominator.
    pub scale: f64,
}

/// Axis-aligned bounding box in the pyramid's coordinate system.
///
/// Derived externally from the area-of-interest geometry; the engine only
/// ever reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub spatial_reference: SpatialReference,
}

impl Extent {
    /// Builds an extent, rejecting inverted or non-finite bounds.
    pub fn new(
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        spatial_reference: SpatialReference,
    ) -> Result<Self, PyramidError> {
        let finite = [xmin, ymin, xmax, ymax].iter().all(|v| v.is_finite());
        if !finite || xmin > xmax || ymin > ymax {
            return Err(PyramidError::InvalidExtent {
                xmin,
                ymin,
                xmax,
                ymax,
            });
        }
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
            spatial_reference,
        })
    }
}

/// Immutable description of a tile pyramid.
///
/// Loaded once per run from the vendor's service document plus the tile
/// endpoint URL; read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PyramidDescriptor {
    base_url: String,
    levels: Vec<LevelOfDetail>,
    origin: GridOrigin,
    tile_size: u32,
    spatial_reference: SpatialReference,
}

impl PyramidDescriptor {
    /// Assembles and validates a descriptor.
    ///
    /// Validation is load-time and fatal: an empty level list, a
    /// non-positive resolution or scale, or non-square tiles abort before
    /// any tile work starts.
    pub fn new(
        base_url: impl Into<String>,
        levels: Vec<LevelOfDetail>,
        origin: GridOrigin,
        tile_width: u32,
        tile_height: u32,
        spatial_reference: SpatialReference,
    ) -> Result<Self, PyramidError> {
        if levels.is_empty() {
            return Err(PyramidError::NoLevels);
        }
        for lod in &levels {
            let ok = lod.resolution.is_finite()
                && lod.resolution > 0.0
                && lod.scale.is_finite()
                && lod.scale > 0.0;
            if !ok {
                return Err(PyramidError::BadLevel { level: lod.level });
            }
        }
        if tile_width != tile_height {
            return Err(PyramidError::NonSquareTiles {
                width: tile_width,
                height: tile_height,
            });
        }

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            base_url,
            levels,
            origin,
            tile_size: tile_width,
            spatial_reference,
        })
    }

    /// Levels in descriptor order; the engine processes exactly these,
    /// strictly sequentially.
    pub fn levels(&self) -> &[LevelOfDetail] {
        &self.levels
    }

    pub fn origin(&self) -> GridOrigin {
        self.origin
    }

    /// Tile edge length in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn spatial_reference(&self) -> SpatialReference {
        self.spatial_reference
    }

    /// Ground-space geometry of one level.
    pub fn geometry(&self, lod: &LevelOfDetail) -> LevelGeometry {
        LevelGeometry {
            resolution: lod.resolution,
            origin: self.origin,
            tile_size: self.tile_size,
        }
    }

    /// Fetch URL for one tile: `{base_url}/{level}/{row}/{col}`.
    pub fn tile_url(&self, level: u32, row: i64, col: i64) -> String {
        format!("{}/{}/{}/{}", self.base_url, level, row, col)
    }
}
