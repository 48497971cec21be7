//! Core processing modules: footprint math, georeferencing, progress, and
//! the batch driver

pub mod batch;
pub mod geo;
pub mod georef;
pub mod progress;

// Re-export main types
pub use batch::{BatchOrchestrator, BatchReceipt, SkippedTile};
pub use georef::GeoReferencer;
pub use progress::{BatchStatus, DhmSpan, ProgressEstimate, ProgressEstimator};
