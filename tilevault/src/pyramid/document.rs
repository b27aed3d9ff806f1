//! Service document parsing.
//!
//! The vendor publishes a JSON service description whose `tileInfo` block
//! carries everything the engine needs: per-level resolutions, the grid
//! origin, the tile pixel size and the spatial reference. Fetching and
//! semantic validation of that document happen upstream; this module only
//! maps an already-obtained document onto the descriptor types.

use serde::Deserialize;

use super::types::{Extent, LevelOfDetail, PyramidDescriptor, PyramidError, SpatialReference};
use crate::grid::GridOrigin;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceDocument {
    tile_info: TileInfoDoc,
    full_extent: Option<ExtentDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TileInfoDoc {
    rows: u32,
    cols: u32,
    origin: PointDoc,
    spatial_reference: SpatialReferenceDoc,
    lods: Vec<LodDoc>,
}

#[derive(Debug, Deserialize)]
struct PointDoc {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct SpatialReferenceDoc {
    wkid: u32,
}

#[derive(Debug, Deserialize)]
struct LodDoc {
    level: u32,
    resolution: f64,
    scale: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtentDoc {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    spatial_reference: SpatialReferenceDoc,
}

/// Parses a service document into a descriptor plus the service's declared
/// full extent, when the document carries one.
///
/// `base_url` is the tile endpoint the engine will fetch from; it is not
/// part of the document itself.
pub fn from_service_json(
    json: &str,
    base_url: impl Into<String>,
) -> Result<(PyramidDescriptor, Option<Extent>), PyramidError> {
    let doc: ServiceDocument = serde_json::from_str(json)?;
    let info = doc.tile_info;

    let levels = info
        .lods
        .iter()
        .map(|l| LevelOfDetail {
            level: l.level,
            resolution: l.resolution,
            scale: l.scale,
        })
        .collect();

    let descriptor = PyramidDescriptor::new(
        base_url,
        levels,
        GridOrigin {
            x: info.origin.x,
            y: info.origin.y,
        },
        info.cols,
        info.rows,
        SpatialReference::new(info.spatial_reference.wkid),
    )?;

    let full_extent = match doc.full_extent {
        Some(e) => Some(Extent::new(
            e.xmin,
            e.ymin,
            e.xmax,
            e.ymax,
            SpatialReference::new(e.spatial_reference.wkid),
        )?),
        None => None,
    };

    Ok((descriptor, full_extent))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "tileInfo": {
            "rows": 256,
            "cols": 256,
            "dpi": 96,
            "origin": { "x": -20037508.342787, "y": 20037508.342787 },
            "spatialReference": { "wkid": 102100 },
            "lods": [
                { "level": 0, "resolution": 156543.033928, "scale": 591657527.591555 },
                { "level": 1, "resolution": 78271.5169639999, "scale": 295828763.795777 }
            ]
        },
        "fullExtent": {
            "xmin": -14830669.0,
            "ymin": 2710819.0,
            "xmax": -6910737.0,
            "ymax": 6850125.0,
            "spatialReference": { "wkid": 102100 }
        }
    }"#;

    #[test]
    fn test_parses_tile_info_block() {
        let (pyramid, _) = from_service_json(DOC, "http://example.com/tile").unwrap();
        assert_eq!(pyramid.levels().len(), 2);
        assert_eq!(pyramid.levels()[1].level, 1);
        assert_eq!(pyramid.tile_size(), 256);
        assert_eq!(pyramid.spatial_reference().wkid(), 102100);
        assert!((pyramid.origin().y - 20037508.342787).abs() < 1e-6);
    }

    #[test]
    fn test_parses_full_extent() {
        let (_, extent) = from_service_json(DOC, "http://example.com/tile").unwrap();
        let extent = extent.expect("document declares a full extent");
        assert_eq!(extent.spatial_reference.wkid(), 102100);
        assert!(extent.xmin < extent.xmax);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        // Real documents carry far more than tileInfo; `dpi` above stands
        // in for them.
        assert!(from_service_json(DOC, "http://example.com/tile").is_ok());
    }

    #[test]
    fn test_garbage_document_is_a_document_error() {
        let err = from_service_json("{not json", "http://example.com/tile").unwrap_err();
        assert!(matches!(err, PyramidError::Document(_)));
    }

    #[test]
    fn test_empty_lods_rejected_at_load() {
        let doc = r#"{
            "tileInfo": {
                "rows": 256, "cols": 256,
                "origin": { "x": 0, "y": 0 },
                "spatialReference": { "wkid": 3857 },
                "lods": []
            }
        }"#;
        let err = from_service_json(doc, "http://example.com/tile").unwrap_err();
        assert!(matches!(err, PyramidError::NoLevels));
    }
}
