//! Idempotent per-tile materialization.
//!
//! One call owns the whole lifecycle of a single tile: probe the level
//! directory for a prior artifact, fetch over HTTP only when absent,
//! persist the body under the cache naming convention, and (re)write the
//! georeference sidecar. Every failure is local to the tile; the function
//! reports an outcome for telemetry and never propagates an error.

use std::path::Path;

use tracing::{debug, warn};

use crate::fetch::AsyncHttpClient;
use crate::grid::{LevelGeometry, TileCoord};
use crate::naming::{CacheKey, TileFormat};
use crate::worldfile::write_world_file;

/// How a tile settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterializeStatus {
    /// Fetched over the network and persisted this run.
    Fetched,
    /// Found already materialized on disk; no network access.
    AlreadyPresent,
    /// Not materialized: the server did not have it or persisting failed.
    Missing,
}

/// Result of materializing one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOutcome {
    /// Persisted format, when one exists on disk.
    pub format: Option<TileFormat>,
    pub status: MaterializeStatus,
}

/// Looks up a previously materialized artifact for `key` in `level_dir`.
///
/// Probes the closed format set in fixed order (PNG before JPEG). This is
/// the idempotence check: it runs exactly once per tile, before any
/// network work is scheduled for it.
pub fn existing_artifact(level_dir: &Path, key: &CacheKey) -> Option<TileFormat> {
    TileFormat::PROBE_ORDER
        .into_iter()
        .find(|format| level_dir.join(key.image_file_name(*format)).exists())
}

/// Materializes one tile into `level_dir`.
///
/// Re-running over a partially populated directory skips the fetch for
/// every tile that already has an image file; the sidecar is rewritten
/// either way so it stays consistent with the current grid geometry. On a
/// failed fetch nothing is written, not even an empty file, so a later
/// run retries the tile.
pub async fn materialize_tile<C: AsyncHttpClient>(
    client: &C,
    coord: &TileCoord,
    url: &str,
    level_dir: &Path,
    geometry: &LevelGeometry,
) -> MaterializeOutcome {
    let key = CacheKey::new(coord);

    if let Some(format) = existing_artifact(level_dir, &key) {
        debug!(tile = %coord, "already materialized, skipping fetch");
        refresh_sidecar(level_dir, coord, format, geometry);
        return MaterializeOutcome {
            format: Some(format),
            status: MaterializeStatus::AlreadyPresent,
        };
    }

    let response = match client.get(url).await {
        Ok(response) => response,
        Err(e) => {
            warn!(tile = %coord, url, error = %e, "tile missing");
            return MaterializeOutcome {
                format: None,
                status: MaterializeStatus::Missing,
            };
        }
    };

    let format = TileFormat::from_content_type(response.content_type.as_deref());
    let image_path = level_dir.join(key.image_file_name(format));

    if let Err(e) = tokio::fs::write(&image_path, &response.bytes).await {
        warn!(tile = %coord, path = %image_path.display(), error = %e, "tile write failed");
        // Never leave a partial file behind; a later run must retry.
        let _ = tokio::fs::remove_file(&image_path).await;
        return MaterializeOutcome {
            format: None,
            status: MaterializeStatus::Missing,
        };
    }

    refresh_sidecar(level_dir, coord, format, geometry);

    MaterializeOutcome {
        format: Some(format),
        status: MaterializeStatus::Fetched,
    }
}

fn refresh_sidecar(
    level_dir: &Path,
    coord: &TileCoord,
    format: TileFormat,
    geometry: &LevelGeometry,
) {
    if let Err(e) = write_world_file(level_dir, coord, format, geometry) {
        warn!(tile = %coord, error = %e, "world file write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, MockHttpClient, TileResponse};
    use crate::grid::GridOrigin;
    use std::fs;

    fn geometry() -> LevelGeometry {
        LevelGeometry {
            resolution: 1.0,
            origin: GridOrigin { x: 0.0, y: 0.0 },
            tile_size: 256,
        }
    }

    fn coord() -> TileCoord {
        TileCoord { level: 2, x: 5, y: 5 }
    }

    fn png_client() -> MockHttpClient {
        MockHttpClient::with_response(Ok(TileResponse {
            bytes: vec![0x89, b'P', b'N', b'G'],
            content_type: Some("image/png".to_string()),
        }))
    }

    #[tokio::test]
    async fn test_fetch_persists_image_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let client = png_client();

        let outcome =
            materialize_tile(&client, &coord(), "http://c/tile/2/5/5", dir.path(), &geometry())
                .await;

        assert_eq!(outcome.status, MaterializeStatus::Fetched);
        assert_eq!(outcome.format, Some(TileFormat::Png));
        assert!(dir.path().join("R00000005C00000005.png").exists());
        assert!(dir.path().join("R00000005C00000005.pgw").exists());
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent_with_zero_requests() {
        let dir = tempfile::tempdir().unwrap();
        let client = png_client();
        let url = "http://c/tile/2/5/5";

        materialize_tile(&client, &coord(), url, dir.path(), &geometry()).await;
        let image = fs::read(dir.path().join("R00000005C00000005.png")).unwrap();
        let sidecar = fs::read(dir.path().join("R00000005C00000005.pgw")).unwrap();

        let outcome = materialize_tile(&client, &coord(), url, dir.path(), &geometry()).await;

        assert_eq!(outcome.status, MaterializeStatus::AlreadyPresent);
        assert_eq!(outcome.format, Some(TileFormat::Png));
        // Exactly the first run's request; artifacts byte-identical.
        assert_eq!(client.request_count(), 1);
        assert_eq!(fs::read(dir.path().join("R00000005C00000005.png")).unwrap(), image);
        assert_eq!(fs::read(dir.path().join("R00000005C00000005.pgw")).unwrap(), sidecar);
    }

    #[tokio::test]
    async fn test_missing_tile_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::with_response(Err(FetchError::Status {
            status: 404,
            url: "http://c/tile/2/5/5".to_string(),
        }));

        let outcome =
            materialize_tile(&client, &coord(), "http://c/tile/2/5/5", dir.path(), &geometry())
                .await;

        assert_eq!(outcome.status, MaterializeStatus::Missing);
        assert_eq!(outcome.format, None);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_content_type_falls_back_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::with_response(Ok(TileResponse {
            bytes: vec![0xFF, 0xD8],
            content_type: None,
        }));

        let outcome =
            materialize_tile(&client, &coord(), "http://c/tile/2/5/5", dir.path(), &geometry())
                .await;

        assert_eq!(outcome.format, Some(TileFormat::Jpeg));
        assert!(dir.path().join("R00000005C00000005.jpeg").exists());
        assert!(dir.path().join("R00000005C00000005.jgw").exists());
    }

    #[tokio::test]
    async fn test_prior_jpeg_artifact_is_detected_and_sidecar_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("R00000005C00000005.jpeg"), b"prior").unwrap();

        let client = png_client();
        let outcome =
            materialize_tile(&client, &coord(), "http://c/tile/2/5/5", dir.path(), &geometry())
                .await;

        assert_eq!(outcome.status, MaterializeStatus::AlreadyPresent);
        assert_eq!(outcome.format, Some(TileFormat::Jpeg));
        assert_eq!(client.request_count(), 0);
        // Sidecar regenerated for the existing tile.
        assert!(dir.path().join("R00000005C00000005.jgw").exists());
    }

    #[tokio::test]
    async fn test_probe_order_prefers_png() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("R00000005C00000005.png"), b"a").unwrap();
        fs::write(dir.path().join("R00000005C00000005.jpeg"), b"b").unwrap();

        let key = CacheKey::new(&coord());
        assert_eq!(existing_artifact(dir.path(), &key), Some(TileFormat::Png));
    }
}
