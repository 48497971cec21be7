//! geotagger: a resumable batch georeferencer for center-named raster tiles
//!
//! Tiles produced by an external acquisition pipeline are named by their
//! geographic center (`IMG0007_LT-12.25_LG45.5.png`). This library turns a
//! directory of such tiles into WGS84 GeoTIFFs, detects when an in-flight
//! tile download has finished or stalled, and can build a virtual raster
//! catalog over a run's outputs.

pub mod core;
pub mod io;
pub mod types;

// Re-export main types and services for easier access
pub use types::{
    BoundingBox, CornerSet, DownloadState, GeoPoint, GeoTransform, GeotagError, GeotagResult,
    GroundSample, TileRecord,
};

pub use crate::core::{
    BatchOrchestrator, BatchReceipt, BatchStatus, GeoReferencer, ProgressEstimate,
    ProgressEstimator, SkippedTile,
};

pub use crate::io::{
    CancelToken, DownloadMonitor, LogNotifier, MosaicIndex, Notifier, RunConfig, StabilityProbe,
};
