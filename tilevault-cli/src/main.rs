//! Tilevault CLI - materialize a tile cache from the command line.
//!
//! Loads an already-fetched service description document, resolves the
//! extent of interest and drives the engine against a destination
//! directory. Re-running against the same destination resumes the cache.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use tilevault::config::DownloadConfig;
use tilevault::fetch::ReqwestClient;
use tilevault::logging::{default_log_dir, default_log_file, init_logging};
use tilevault::orchestrator::Engine;
use tilevault::pyramid::{self, Extent, SpatialReference};
use tracing::info;

mod error;
use error::CliError;

#[derive(Parser)]
#[command(name = "tilevault")]
#[command(version = tilevault::VERSION)]
#[command(about = "Materialize a georeferenced tile cache over an extent", long_about = None)]
struct Args {
    /// Path to the service description JSON document (already fetched)
    #[arg(long, value_name = "FILE")]
    service_info: PathBuf,

    /// Tile endpoint URL, e.g. https://host/rest/services/Map/MapServer/tile
    #[arg(long)]
    url: String,

    /// Destination directory for the cache tree
    #[arg(long, value_name = "DIR")]
    dest: PathBuf,

    /// Extent override, west edge (defaults to the service's full extent)
    #[arg(long)]
    xmin: Option<f64>,

    /// Extent override, south edge
    #[arg(long)]
    ymin: Option<f64>,

    /// Extent override, east edge
    #[arg(long)]
    xmax: Option<f64>,

    /// Extent override, north edge
    #[arg(long)]
    ymax: Option<f64>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

impl Args {
    /// The four extent flags, all or none.
    fn extent_override(&self) -> Result<Option<(f64, f64, f64, f64)>, CliError> {
        match (self.xmin, self.ymin, self.xmax, self.ymax) {
            (Some(xmin), Some(ymin), Some(xmax), Some(ymax)) => {
                Ok(Some((xmin, ymin, xmax, ymax)))
            }
            (None, None, None, None) => Ok(None),
            _ => Err(CliError::Usage(
                "extent overrides need all of --xmin --ymin --xmax --ymax".to_string(),
            )),
        }
    }
}

/// Picks the run extent: explicit flags win, otherwise the service's
/// declared full extent.
fn resolve_extent(
    overrides: Option<(f64, f64, f64, f64)>,
    declared: Option<Extent>,
    spatial_reference: SpatialReference,
) -> Result<Extent, CliError> {
    match (overrides, declared) {
        (Some((xmin, ymin, xmax, ymax)), _) => {
            Ok(Extent::new(xmin, ymin, xmax, ymax, spatial_reference)?)
        }
        (None, Some(extent)) => Ok(extent),
        (None, None) => Err(CliError::Usage(
            "service declares no full extent; pass --xmin --ymin --xmax --ymax".to_string(),
        )),
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let document = std::fs::read_to_string(&args.service_info)?;
    let (descriptor, declared) = pyramid::from_service_json(&document, &args.url)?;
    let extent = resolve_extent(
        args.extent_override()?,
        declared,
        descriptor.spatial_reference(),
    )?;

    info!(
        levels = descriptor.levels().len(),
        srs = %descriptor.spatial_reference(),
        dest = %args.dest.display(),
        "loaded pyramid descriptor"
    );

    let config = DownloadConfig::new().with_timeout_secs(args.timeout_secs);
    let client = ReqwestClient::with_config(&config)?;
    let engine = Engine::new(client);

    // Independent reporting sink: the engine owns the counters, this task
    // only reads snapshots.
    let progress = engine.progress();
    let reporter = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(2)).await;
            let snap = progress.snapshot();
            if snap.total_tiles > 0 {
                info!(
                    "progress: {}/{} tiles ({:.1}%), level {}/{}",
                    snap.completed_tiles,
                    snap.total_tiles,
                    snap.overall_fraction() * 100.0,
                    snap.level_completed,
                    snap.level_total,
                );
            }
        }
    });

    let summary = engine.run(&descriptor, &extent, &args.dest).await;
    reporter.abort();
    let summary = summary?;

    println!();
    println!("Materialized {} levels, {} tiles:", summary.levels, summary.total_tiles);
    println!("  fetched:         {}", summary.fetched);
    println!("  already present: {}", summary.already_present);
    println!("  missing:         {}", summary.missing);

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extent: [Option<f64>; 4]) -> Args {
        Args {
            service_info: PathBuf::from("service.json"),
            url: "http://cache.test/tile".to_string(),
            dest: PathBuf::from("out"),
            xmin: extent[0],
            ymin: extent[1],
            xmax: extent[2],
            ymax: extent[3],
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_extent_override_all_or_none() {
        assert!(args([None; 4]).extent_override().unwrap().is_none());
        assert!(args([Some(0.0), Some(1.0), Some(2.0), Some(3.0)])
            .extent_override()
            .unwrap()
            .is_some());
        assert!(args([Some(0.0), None, None, None]).extent_override().is_err());
    }

    #[test]
    fn test_resolve_extent_prefers_overrides() {
        let sr = SpatialReference::new(3857);
        let declared = Extent::new(-10.0, -10.0, 10.0, 10.0, sr).unwrap();

        let extent =
            resolve_extent(Some((0.0, 0.0, 5.0, 5.0)), Some(declared), sr).unwrap();
        assert_eq!(extent.xmax, 5.0);

        let extent = resolve_extent(None, Some(declared), sr).unwrap();
        assert_eq!(extent.xmax, 10.0);
    }

    #[test]
    fn test_resolve_extent_requires_some_source() {
        let sr = SpatialReference::new(3857);
        assert!(matches!(
            resolve_extent(None, None, sr),
            Err(CliError::Usage(_))
        ));
    }
}
