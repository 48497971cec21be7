use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Geographic point in decimal degrees, WGS84 datum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check the WGS84 range invariant (lat in [-90, 90], lon in [-180, 180])
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Ground sample distance in meters per pixel, per axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSample {
    pub x: f64,
    pub y: f64,
}

impl GroundSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same resolution on both axes
    pub fn square(meters: f64) -> Self {
        Self { x: meters, y: meters }
    }
}

/// One input tile: source path plus the geometry parsed from its filename.
/// Immutable once constructed; pixel dimension hints may be absent, in which
/// case the loaded raster's real dimensions are authoritative.
#[derive(Debug, Clone)]
pub struct TileRecord {
    /// Sequence number (parsed from the filename id token, or the list index)
    pub id: u32,
    pub path: PathBuf,
    pub center: GeoPoint,
    pub width_px: Option<usize>,
    pub height_px: Option<usize>,
    pub gsd: GroundSample,
}

/// The four corners of a tile footprint, with an altitude placeholder
#[derive(Debug, Clone, Copy)]
pub struct CornerSet {
    pub top_left: GeoPoint,
    pub top_right: GeoPoint,
    pub bottom_right: GeoPoint,
    pub bottom_left: GeoPoint,
    /// Always zero; the source geometry carries no height information
    pub altitude: f64,
}

impl CornerSet {
    pub fn points(&self) -> [GeoPoint; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }
}

/// Geographic bounding box in degrees (no antimeridian crossing)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

/// Pixel-to-geographic affine transform parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// GDAL-ordered coefficient array
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Map a (column, row) pixel position to geographic (lon, lat)
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.top_left_x + col * self.pixel_width + row * self.rotation_x;
        let y = self.top_left_y + col * self.rotation_y + row * self.pixel_height;
        (x, y)
    }
}

/// Lifecycle of one monitored in-flight file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    /// Polling started, no non-zero size seen yet
    Waiting,
    /// Last sample was non-zero; one more equal reading completes
    StableCandidate,
    /// Stall threshold exceeded without two equal non-zero readings.
    /// Not terminal; polling continues.
    Stalled,
    /// Two consecutive equal non-zero size samples observed
    Complete,
}

impl std::fmt::Display for DownloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadState::Waiting => write!(f, "WAITING"),
            DownloadState::StableCandidate => write!(f, "STABLE_CANDIDATE"),
            DownloadState::Stalled => write!(f, "STALLED"),
            DownloadState::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// Error types for georeferencing and batch processing
#[derive(Debug, thiserror::Error)]
pub enum GeotagError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("malformed filename: {0}")]
    MalformedFilename(String),

    #[error("degenerate center latitude {0}: east/west offsets are undefined at the poles")]
    DegenerateCoordinate(f64),

    #[error("empty batch range: start {start} >= stop {stop}")]
    EmptyBatchRange { start: usize, stop: usize },

    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),

    #[error("wait cancelled for {0}")]
    Cancelled(String),

    #[error("no georeferenced rasters found in {0}")]
    EmptyMosaic(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("processing error: {0}")]
    Processing(String),
}

/// Result type for georeferencing operations
pub type GeotagResult<T> = Result<T, GeotagError>;
