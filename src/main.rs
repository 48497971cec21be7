use anyhow::{bail, Context};
use clap::Parser;
use geotagger::{BatchOrchestrator, DownloadMonitor, LogNotifier, RunConfig};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Batch georeferencer for center-named raster tiles
#[derive(Parser, Debug)]
#[command(author, version, about = "Georeference a folder of center-named tiles to WGS84 GeoTIFFs", long_about = None)]
struct Cli {
    /// Folder of input tiles named `<id>_LT<lat>_LG<lon>.<ext>`
    #[arg(long, short = 'i')]
    inputpath: PathBuf,

    /// Destination folder (default: a `<input>_GEOTAGGED` sibling)
    #[arg(long, short = 'o')]
    outputpath: Option<PathBuf>,

    /// First listing index to process, inclusive (default: 0)
    #[arg(long, short = 's')]
    start: Option<usize>,

    /// Last listing index, exclusive (default: the full listing)
    #[arg(long, short = 'e')]
    end: Option<usize>,

    /// Build a virtual raster catalog over the output folder afterwards
    #[arg(long, short = 'v')]
    vrt: bool,

    /// Wait for each source file to finish downloading before processing it
    #[arg(long, short = 'w')]
    wait: bool,

    /// JSON configuration file (stall threshold, ground sample, alerting)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("========== Batch Georeferencer Starting ==========");
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("Batch failed: {:#}", e);
        std::process::exit(1);
    }
    info!("========== Batch Georeferencer Complete ==========");
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };

    if !cli.inputpath.is_dir() {
        bail!("input path {} is not a directory", cli.inputpath.display());
    }
    let input = cli
        .inputpath
        .canonicalize()
        .unwrap_or_else(|_| cli.inputpath.clone());

    let output_dir = match cli.outputpath {
        Some(path) => path,
        None => default_output_dir(&input),
    };

    let files = list_tiles(&input)?;
    if files.is_empty() {
        bail!("no files found in {}", input.display());
    }

    let start = cli.start.unwrap_or(0);
    let stop = cli.end.unwrap_or(files.len());
    info!(
        "Input: {} ({} files), output: {}, range [{}, {})",
        input.display(),
        files.len(),
        output_dir.display(),
        start,
        stop
    );

    let mut orchestrator = BatchOrchestrator::new(&output_dir, config.ground_sample());
    if cli.wait {
        let monitor = DownloadMonitor::new(config.machine_identifier.clone())
            .with_stall_threshold(Duration::from_secs(config.stall_threshold_seconds));
        orchestrator = orchestrator
            .with_monitor(monitor)
            .with_notifier(Box::new(LogNotifier::new(
                config.notification_recipients.clone(),
            )));
    }

    let receipt = orchestrator.process_range(&files, start, stop)?;

    if cli.vrt {
        let catalog = orchestrator.build_mosaic(&receipt)?;
        info!("Mosaic catalog written to {}", catalog.display());
    }

    info!(
        "Done: {} tiles written, {} skipped",
        receipt.processed.len(),
        receipt.skipped.len()
    );
    Ok(())
}

/// `<input-leaf>_GEOTAGGED` next to the input folder
fn default_output_dir(input: &Path) -> PathBuf {
    let leaf = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("tiles");
    match input.parent() {
        Some(parent) => parent.join(format!("{}_GEOTAGGED", leaf)),
        None => PathBuf::from(format!("{}_GEOTAGGED", leaf)),
    }
}

/// Sorted listing of the input folder; order defines batch indices
fn list_tiles(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(input)
        .with_context(|| format!("reading {}", input.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}
