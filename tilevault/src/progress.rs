//! Run-wide progress accounting.
//!
//! The orchestrator is the only writer: it fixes the run total up front,
//! resets the per-level counters at each level boundary, and records one
//! completion per tile. Readers (the CLI's reporting task, tests) take
//! consistent-enough snapshots without blocking the writer.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::materialize::{MaterializeOutcome, MaterializeStatus};

/// Progress counters for one materialization run.
///
/// Counters are atomics so a truly parallel runtime keeps them race-free;
/// the single-writer discipline still holds, atomics just make it safe
/// rather than assumed.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    total_tiles: AtomicU64,
    completed_tiles: AtomicU64,
    level_total: AtomicU64,
    level_completed: AtomicU64,
    fetched: AtomicU64,
    already_present: AtomicU64,
    missing: AtomicU64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the run-wide tile total before any fetch begins.
    ///
    /// The total is the denominator for overall progress and never changes
    /// during the run.
    pub fn begin_run(&self, total_tiles: u64) {
        self.total_tiles.store(total_tiles, Ordering::Relaxed);
        self.completed_tiles.store(0, Ordering::Relaxed);
        self.fetched.store(0, Ordering::Relaxed);
        self.already_present.store(0, Ordering::Relaxed);
        self.missing.store(0, Ordering::Relaxed);
    }

    /// Resets the per-level counters at a level boundary.
    pub fn begin_level(&self, level_total: u64) {
        self.level_total.store(level_total, Ordering::Relaxed);
        self.level_completed.store(0, Ordering::Relaxed);
    }

    /// Records one settled tile, whatever its outcome.
    pub fn record(&self, outcome: &MaterializeOutcome) {
        match outcome.status {
            MaterializeStatus::Fetched => self.fetched.fetch_add(1, Ordering::Relaxed),
            MaterializeStatus::AlreadyPresent => {
                self.already_present.fetch_add(1, Ordering::Relaxed)
            }
            MaterializeStatus::Missing => self.missing.fetch_add(1, Ordering::Relaxed),
        };
        self.completed_tiles.fetch_add(1, Ordering::Relaxed);
        self.level_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot of the current counters.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_tiles: self.total_tiles.load(Ordering::Relaxed),
            completed_tiles: self.completed_tiles.load(Ordering::Relaxed),
            level_total: self.level_total.load(Ordering::Relaxed),
            level_completed: self.level_completed.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            already_present: self.already_present.load(Ordering::Relaxed),
            missing: self.missing.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a run's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    /// Tiles across all levels, fixed at run start.
    pub total_tiles: u64,
    /// Tiles settled so far (fetched, skipped or missing).
    pub completed_tiles: u64,
    /// Tiles in the level currently being processed.
    pub level_total: u64,
    /// Settled tiles in the current level.
    pub level_completed: u64,
    /// Tiles fetched over the network this run.
    pub fetched: u64,
    /// Tiles found already materialized on disk.
    pub already_present: u64,
    /// Tiles the server did not have (or that failed locally).
    pub missing: u64,
}

impl ProgressSnapshot {
    /// Overall completion in `0.0..=1.0`; zero-tile runs read as complete.
    pub fn overall_fraction(&self) -> f64 {
        if self.total_tiles == 0 {
            1.0
        } else {
            self.completed_tiles as f64 / self.total_tiles as f64
        }
    }

    /// Completion of the current level in `0.0..=1.0`.
    pub fn level_fraction(&self) -> f64 {
        if self.level_total == 0 {
            1.0
        } else {
            self.level_completed as f64 / self.level_total as f64
        }
    }
}
