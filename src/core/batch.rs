//! Resumable batch driver: georeferences an ordered tile list one item at a
//! time, with optional download-completion waits and a mosaic catalog built
//! strictly after all writes.

use crate::core::georef::GeoReferencer;
use crate::core::progress::ProgressEstimator;
use crate::io::monitor::{CancelToken, DownloadMonitor};
use crate::io::mosaic::MosaicIndex;
use crate::io::notify::{LogNotifier, Notifier};
use crate::types::{GeotagError, GeotagResult, GroundSample};
use std::path::{Path, PathBuf};

/// One tile left out of a run, with the index it held in the listing
#[derive(Debug)]
pub struct SkippedTile {
    pub index: usize,
    pub file: String,
    pub reason: String,
}

/// Proof that a range has been processed; required to build the mosaic.
///
/// Holding the receipt is what guarantees the writes-before-catalog
/// ordering: `build_mosaic` cannot be reached without one.
#[derive(Debug)]
pub struct BatchReceipt {
    pub output_dir: PathBuf,
    pub processed: Vec<usize>,
    pub skipped: Vec<SkippedTile>,
}

/// Sequential batch orchestrator.
///
/// Single in-flight item at a time; the only suspension point is the
/// download monitor's poll sleep, and it suspends the whole batch.
pub struct BatchOrchestrator {
    georef: GeoReferencer,
    gsd: GroundSample,
    monitor: Option<DownloadMonitor>,
    notifier: Box<dyn Notifier>,
    cancel: CancelToken,
}

impl BatchOrchestrator {
    pub fn new<P: AsRef<Path>>(output_dir: P, gsd: GroundSample) -> Self {
        Self {
            georef: GeoReferencer::new(output_dir),
            gsd,
            monitor: None,
            notifier: Box::new(LogNotifier::new(Vec::new())),
            cancel: CancelToken::new(),
        }
    }

    /// Wait for each source file to stabilize before processing it
    pub fn with_monitor(mut self, monitor: DownloadMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn output_dir(&self) -> &Path {
        self.georef.output_dir()
    }

    /// Process `files[start..stop)` in listing order.
    ///
    /// `stop` is clamped to the list length; an empty resolved range is
    /// rejected before any tile runs. Per-tile failures (unparsable name,
    /// polar center, write error on one raster) are logged and skipped; a
    /// missing or uncreatable output directory and cancellation are fatal.
    ///
    /// Resumability: indices refer to positions in `files`, so re-invoking
    /// with the same listing and a later `start` touches only the remainder.
    pub fn process_range(
        &self,
        files: &[PathBuf],
        start: usize,
        stop: usize,
    ) -> GeotagResult<BatchReceipt> {
        let stop = stop.min(files.len());
        if start >= stop {
            return Err(GeotagError::EmptyBatchRange { start, stop });
        }

        // Systemic write failures surface here, before any tile is touched
        std::fs::create_dir_all(self.georef.output_dir())?;

        log::info!(
            "Batch range [{}, {}): {} tiles -> {}",
            start,
            stop,
            stop - start,
            self.georef.output_dir().display()
        );

        let mut progress = ProgressEstimator::new(stop - start);
        let mut processed = Vec::new();
        let mut skipped = Vec::new();

        for index in start..stop {
            let path = &files[index];
            let display_name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("<non-utf8>")
                .to_string();

            if let Some(monitor) = &self.monitor {
                monitor.wait_for_completion(path, self.notifier.as_ref(), &self.cancel)?;
            }

            match self.process_one(index, path) {
                Ok(output) => {
                    processed.push(index);
                    log::debug!("Tile {} written to {}", index, output.display());
                }
                Err(e) => {
                    if !self.georef.output_dir().is_dir() {
                        // The whole run cannot proceed without its destination
                        log::error!("Output directory vanished, aborting batch");
                        return Err(e);
                    }
                    log::warn!("Skipping tile {} ({}): {}", index, display_name, e);
                    skipped.push(SkippedTile {
                        index,
                        file: display_name,
                        reason: e.to_string(),
                    });
                }
            }

            progress.record_completed();
            if let Some(est) = progress.estimate() {
                log::info!(
                    "[{}] {}/{} done, {} remaining, {:.2} sec per tile, ETA {}, elapsed {}",
                    est.status,
                    progress.completed(),
                    stop - start,
                    est.remaining,
                    est.secs_per_item,
                    est.eta,
                    est.elapsed
                );
            }
        }

        if skipped.is_empty() {
            log::info!("Batch complete: {} tiles written", processed.len());
        } else {
            log::warn!(
                "Batch complete: {} tiles written, {} skipped",
                processed.len(),
                skipped.len()
            );
            for s in &skipped {
                log::warn!("  skipped index {} ({}): {}", s.index, s.file, s.reason);
            }
        }

        Ok(BatchReceipt {
            output_dir: self.georef.output_dir().to_path_buf(),
            processed,
            skipped,
        })
    }

    fn process_one(&self, index: usize, path: &Path) -> GeotagResult<PathBuf> {
        let tile = GeoReferencer::tile_from_path(index, path, self.gsd)?;
        self.georef.process(&tile)
    }

    /// Build the mosaic catalog over the receipt's output directory.
    ///
    /// Catalogs every raster present in the directory, including outputs of
    /// earlier runs. Returns the catalog path.
    pub fn build_mosaic(&self, receipt: &BatchReceipt) -> GeotagResult<PathBuf> {
        let catalog_path = MosaicIndex::catalog_path(&receipt.output_dir);
        MosaicIndex::build(&receipt.output_dir, &catalog_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_range_is_rejected() {
        let orchestrator =
            BatchOrchestrator::new("/tmp/geotagger-unused", GroundSample::square(0.17475));
        let files = vec![PathBuf::from("IMG0001_LT1.0_LG2.0.png")];

        let result = orchestrator.process_range(&files, 1, 1);
        assert!(matches!(result, Err(GeotagError::EmptyBatchRange { .. })));

        // stop clamps to the listing length; start beyond it is empty too
        let result = orchestrator.process_range(&files, 5, 10);
        assert!(matches!(result, Err(GeotagError::EmptyBatchRange { .. })));

        let result = orchestrator.process_range(&[], 0, 0);
        assert!(matches!(result, Err(GeotagError::EmptyBatchRange { .. })));
    }
}
