//! Download orchestration.
//!
//! The engine drives the level loop: it fixes the run-wide tile total up
//! front, processes levels strictly sequentially, dispatches every tile
//! coordinate of the current level through one global bounded pool, and
//! emits the level's conversion script only after all of the level's
//! tiles have settled. Per-tile failures never abort the run; the
//! destination tree is always a valid, resumable partial result.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::EngineError;
use crate::fetch::AsyncHttpClient;
use crate::grid::{range_covering, LevelGeometry, TileRange};
use crate::materialize::{materialize_tile, MaterializeOutcome};
use crate::naming::ALL_LAYERS_DIR;
use crate::progress::{ProgressSnapshot, ProgressTracker};
use crate::pyramid::{Extent, LevelOfDetail, PyramidDescriptor};
use crate::script::write_conversion_script;

/// Maximum materialize tasks in flight at any instant, across the whole
/// run. A fixed property of the engine, not an input-sized knob: the 11th
/// tile queues until a running one settles, regardless of level
/// boundaries.
pub const MAX_IN_FLIGHT: usize = 10;

/// Final accounting for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub levels: usize,
    pub total_tiles: u64,
    pub fetched: u64,
    pub already_present: u64,
    pub missing: u64,
}

impl From<ProgressSnapshot> for RunSummary {
    fn from(snap: ProgressSnapshot) -> Self {
        Self {
            levels: 0,
            total_tiles: snap.total_tiles,
            fetched: snap.fetched,
            already_present: snap.already_present,
            missing: snap.missing,
        }
    }
}

/// Tile-cache materialization engine.
///
/// Generic over the HTTP client so runs are testable against a mock; the
/// client is cloned into each tile task and is expected to share its
/// connection pool across clones.
pub struct Engine<C> {
    client: C,
    progress: Arc<ProgressTracker>,
}

impl<C> Engine<C>
where
    C: AsyncHttpClient + Clone + Send + Sync + 'static,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            progress: Arc::new(ProgressTracker::new()),
        }
    }

    /// Attaches an externally owned progress tracker, letting a reporting
    /// sink observe the run while it is in flight.
    pub fn with_progress(mut self, progress: Arc<ProgressTracker>) -> Self {
        self.progress = progress;
        self
    }

    /// The run's progress counters, shareable with a reporting sink.
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    /// Materializes every tile of `pyramid` covering `extent` under
    /// `destination_root`.
    ///
    /// Fails fast, before any tile work, when the destination tree cannot
    /// be created or when pyramid and extent disagree on the coordinate
    /// reference system. After that the run always completes: individual
    /// tile failures are logged and counted as missing.
    pub async fn run(
        &self,
        pyramid: &PyramidDescriptor,
        extent: &Extent,
        destination_root: &Path,
    ) -> Result<RunSummary, EngineError> {
        if pyramid.spatial_reference() != extent.spatial_reference {
            return Err(EngineError::SpatialReferenceMismatch {
                pyramid: pyramid.spatial_reference(),
                extent: extent.spatial_reference,
            });
        }

        // Every level's range is computed against the one extent before
        // any fetch, fixing the progress denominator for the whole run.
        let levels: Vec<(LevelOfDetail, LevelGeometry, TileRange)> = pyramid
            .levels()
            .iter()
            .map(|lod| {
                let geometry = pyramid.geometry(lod);
                let range = range_covering(extent, &geometry);
                (*lod, geometry, range)
            })
            .collect();
        let total_tiles: u64 = levels.iter().map(|(_, _, range)| range.tile_count()).sum();

        let cache_root = destination_root.join(ALL_LAYERS_DIR);
        self.prepare_directories(&cache_root, &levels)?;

        self.progress.begin_run(total_tiles);
        info!(
            levels = levels.len(),
            total_tiles, "starting materialization run"
        );

        let semaphore = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
        let srs = pyramid.spatial_reference().epsg_code();

        for (lod, geometry, range) in &levels {
            let level_dir = cache_root.join(format!("L{:02}", lod.level));
            self.run_level(pyramid, lod, geometry, range, &level_dir, &semaphore)
                .await;

            // The level has fully settled; its directory is stable
            // (modulo individually missing tiles) and ready to mosaic.
            if let Err(e) = write_conversion_script(&level_dir, &srs) {
                error!(level = lod.level, error = %e, "conversion script write failed");
            }
        }

        let snapshot = self.progress.snapshot();
        info!(
            fetched = snapshot.fetched,
            already_present = snapshot.already_present,
            missing = snapshot.missing,
            "materialization run complete"
        );

        Ok(RunSummary {
            levels: levels.len(),
            ..RunSummary::from(snapshot)
        })
    }

    /// Creates the whole destination tree up front.
    ///
    /// This doubles as the directory-write capability check: any failure
    /// here is fatal and happens before the first fetch.
    fn prepare_directories(
        &self,
        cache_root: &Path,
        levels: &[(LevelOfDetail, LevelGeometry, TileRange)],
    ) -> Result<(), EngineError> {
        let mkdir = |path: &Path| {
            std::fs::create_dir_all(path).map_err(|source| EngineError::DestinationUnwritable {
                path: path.to_path_buf(),
                source,
            })
        };

        mkdir(cache_root)?;
        for (lod, _, _) in levels {
            mkdir(&cache_root.join(format!("L{:02}", lod.level)))?;
        }
        Ok(())
    }

    /// Submits one level's tiles through the pool and drains them all.
    ///
    /// Returns only after every task of the level has settled, so the
    /// next level never interleaves with this one.
    async fn run_level(
        &self,
        pyramid: &PyramidDescriptor,
        lod: &LevelOfDetail,
        geometry: &LevelGeometry,
        range: &TileRange,
        level_dir: &Path,
        semaphore: &Arc<Semaphore>,
    ) {
        self.progress.begin_level(range.tile_count());
        info!(
            level = lod.level,
            resolution = lod.resolution,
            range = %range,
            tiles = range.tile_count(),
            "level start"
        );

        let mut tasks: JoinSet<MaterializeOutcome> = JoinSet::new();

        for coord in range.coords(lod.level) {
            // Admission control: the permit is acquired before the task
            // exists, so at most MAX_IN_FLIGHT tasks are ever alive.
            let permit = match Arc::clone(semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let client = self.client.clone();
            let url = pyramid.tile_url(coord.level, coord.y, coord.x);
            let level_dir = level_dir.to_path_buf();
            let geometry = *geometry;

            tasks.spawn(async move {
                let outcome =
                    materialize_tile(&client, &coord, &url, &level_dir, &geometry).await;
                drop(permit);
                outcome
            });

            // Keep the counters live while the level is still submitting.
            while let Some(result) = tasks.try_join_next() {
                self.settle(result);
            }
        }

        while let Some(result) = tasks.join_next().await {
            self.settle(result);
        }

        let snapshot = self.progress.snapshot();
        info!(
            level = lod.level,
            completed = snapshot.level_completed,
            "level complete"
        );
    }

    fn settle(&self, result: Result<MaterializeOutcome, tokio::task::JoinError>) {
        match result {
            Ok(outcome) => self.progress.record(&outcome),
            Err(e) => warn!(error = %e, "materialize task panicked"),
        }
    }
}
