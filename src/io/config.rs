//! Run configuration, loaded from the operators' JSON config file.
//!
//! Keys are camelCase to stay compatible with the existing deployment
//! config; every field has a default so a missing file or sparse config
//! still yields a runnable setup.

use crate::types::{GeotagError, GeotagResult, GroundSample};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Default ground sample distance of the acquisition pipeline, meters/pixel
pub const DEFAULT_GROUND_SAMPLE_M: f64 = 0.17475;

/// Default stall threshold, seconds
pub const DEFAULT_STALL_THRESHOLD_S: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    /// Destination root for acquired tiles (monitored downloads land here)
    pub save_path: Option<PathBuf>,
    pub stall_threshold_seconds: u64,
    pub ground_sample_meters_x: f64,
    pub ground_sample_meters_y: f64,
    /// Only used in alert text, to tell operators which host stalled
    pub machine_identifier: String,
    pub notification_recipients: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            save_path: None,
            stall_threshold_seconds: DEFAULT_STALL_THRESHOLD_S,
            ground_sample_meters_x: DEFAULT_GROUND_SAMPLE_M,
            ground_sample_meters_y: DEFAULT_GROUND_SAMPLE_M,
            machine_identifier: "unknown".to_string(),
            notification_recipients: Vec::new(),
        }
    }
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> GeotagResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        let file = File::open(path)?;
        serde_json::from_reader(file)
            .map_err(|e| GeotagError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn ground_sample(&self) -> GroundSample {
        GroundSample::new(self.ground_sample_meters_x, self.ground_sample_meters_y)
    }
}
