//! Georeferencing of a single tile: filename parsing, footprint math, and
//! GeoTIFF output with an embedded pixel-to-geographic transform.

use crate::core::geo;
use crate::types::{
    BoundingBox, GeoPoint, GeoTransform, GeotagError, GeotagResult, GroundSample, TileRecord,
};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use ndarray::{Array2, Array3, Axis};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Output raster band count: RGB, 8-bit unsigned
const OUTPUT_BANDS: usize = 3;

/// Georeferencing service for center-named tiles.
///
/// Stateless across tiles; one `process` call reads one source raster and
/// writes one GeoTIFF into the output directory.
pub struct GeoReferencer {
    output_dir: PathBuf,
}

impl GeoReferencer {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Extract the center coordinate from a tile filename.
    ///
    /// Expected convention: `<id>_LT<lat>_LG<lon>.<ext>`, latitude and
    /// longitude as decimal strings after the two-character markers.
    pub fn parse_center_from_name(filename: &str) -> GeotagResult<GeoPoint> {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| GeotagError::MalformedFilename(filename.to_string()))?;

        let pattern = Regex::new(r"^[^_]+_LT(-?\d+(?:\.\d+)?)_LG(-?\d+(?:\.\d+)?)$")
            .map_err(|e| GeotagError::Processing(format!("regex error: {}", e)))?;

        let captures = pattern
            .captures(stem)
            .ok_or_else(|| GeotagError::MalformedFilename(filename.to_string()))?;

        let lat: f64 = captures[1]
            .parse()
            .map_err(|_| GeotagError::MalformedFilename(filename.to_string()))?;
        let lon: f64 = captures[2]
            .parse()
            .map_err(|_| GeotagError::MalformedFilename(filename.to_string()))?;

        let center = GeoPoint::new(lat, lon);
        if !center.is_valid() {
            return Err(GeotagError::MalformedFilename(format!(
                "{}: coordinate {} outside WGS84 range",
                filename, center
            )));
        }

        Ok(center)
    }

    /// Build a `TileRecord` from a source path, parsing the center from the
    /// filename. The id comes from the leading digit run of the name token
    /// (`IMG0007` -> 7), falling back to the caller-supplied list index.
    pub fn tile_from_path<P: AsRef<Path>>(
        index: usize,
        path: P,
        gsd: GroundSample,
    ) -> GeotagResult<TileRecord> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| GeotagError::MalformedFilename(path.display().to_string()))?;

        let center = Self::parse_center_from_name(filename)?;

        let id_pattern = Regex::new(r"^[^_\d]*(\d+)")
            .map_err(|e| GeotagError::Processing(format!("regex error: {}", e)))?;
        let id = id_pattern
            .captures(filename)
            .and_then(|c| c[1].parse::<u32>().ok())
            .unwrap_or(index as u32);

        Ok(TileRecord {
            id,
            path: path.to_path_buf(),
            center,
            width_px: None,
            height_px: None,
            gsd,
        })
    }

    /// Pixel-to-geographic affine for a bounding box and raster size.
    /// Column 0 / row 0 maps to (west, north); row index increases southward.
    pub fn transform_for(bbox: &BoundingBox, width: usize, height: usize) -> GeoTransform {
        GeoTransform {
            top_left_x: bbox.west,
            pixel_width: (bbox.east - bbox.west) / width as f64,
            rotation_x: 0.0,
            top_left_y: bbox.north,
            rotation_y: 0.0,
            pixel_height: -(bbox.north - bbox.south) / height as f64,
        }
    }

    /// Georeference one tile and write the result as a GeoTIFF.
    ///
    /// The source raster's real dimensions drive the footprint math; any
    /// dimension hints on the record are ignored. Returns the output path.
    pub fn process(&self, tile: &TileRecord) -> GeotagResult<PathBuf> {
        log::debug!("Opening source raster: {}", tile.path.display());
        let dataset = Dataset::open(&tile.path)?;
        let (width, height) = dataset.raster_size();

        if width == 0 || height == 0 {
            return Err(GeotagError::Processing(format!(
                "{}: empty raster",
                tile.path.display()
            )));
        }

        let half_north_m = height as f64 * tile.gsd.y / 2.0;
        let half_east_m = width as f64 * tile.gsd.x / 2.0;

        let corners = geo::compute_corners(tile.center, width, height, half_north_m, half_east_m)?;
        let bbox = geo::bounding_box(&corners);
        let transform = Self::transform_for(&bbox, width, height);

        log::debug!(
            "Tile {} footprint: N={:.8} S={:.8} W={:.8} E={:.8}",
            tile.id,
            bbox.north,
            bbox.south,
            bbox.west,
            bbox.east
        );

        let cube = Self::read_band_first(&dataset, width, height)?;
        let output_path = self.output_path_for(&tile.path)?;
        Self::write_geotiff(&cube, &transform, &output_path)?;

        log::info!(
            "Georeferenced tile {} -> {}",
            tile.path.display(),
            output_path.display()
        );
        Ok(output_path)
    }

    /// Output filename: source stem with the extension replaced by `.tif`,
    /// under the configured output directory.
    fn output_path_for(&self, source: &Path) -> GeotagResult<PathBuf> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| GeotagError::MalformedFilename(source.display().to_string()))?;
        Ok(self.output_dir.join(format!("{}.tif", stem)))
    }

    /// Read the source into a band-first (band, row, col) 8-bit cube.
    ///
    /// Single-band sources are replicated across the three output bands;
    /// bands beyond the third (e.g. alpha) are dropped.
    fn read_band_first(
        dataset: &Dataset,
        width: usize,
        height: usize,
    ) -> GeotagResult<Array3<u8>> {
        let band_count = dataset.raster_count();
        if band_count == 0 {
            return Err(GeotagError::Processing("raster has no bands".to_string()));
        }

        let mut cube = Array3::<u8>::zeros((OUTPUT_BANDS, height, width));
        for out_band in 0..OUTPUT_BANDS {
            let source_index = if band_count as usize > out_band {
                out_band as isize + 1
            } else {
                1
            };
            let band = dataset.rasterband(source_index)?;
            let buffer = band.read_as::<u8>((0, 0), (width, height), (width, height), None)?;
            let plane = Array2::from_shape_vec((height, width), buffer.data)
                .map_err(|e| GeotagError::Processing(format!("band reshape failed: {}", e)))?;
            cube.index_axis_mut(Axis(0), out_band).assign(&plane);
        }

        Ok(cube)
    }

    /// Write a band-first cube as a GeoTIFF with the given transform,
    /// EPSG:4326.
    fn write_geotiff(
        cube: &Array3<u8>,
        transform: &GeoTransform,
        output_path: &Path,
    ) -> GeotagResult<()> {
        let (bands, height, width) = cube.dim();

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset = driver.create_with_band_type::<u8, _>(
            output_path,
            width as isize,
            height as isize,
            bands as isize,
        )?;

        dataset.set_geo_transform(&transform.as_array())?;
        dataset.set_spatial_ref(&SpatialRef::from_epsg(4326)?)?;

        for b in 0..bands {
            let mut rasterband = dataset.rasterband(b as isize + 1)?;
            let flat: Vec<u8> = cube.index_axis(Axis(0), b).iter().cloned().collect();
            let buffer = Buffer::new((width, height), flat);
            rasterband.write((0, 0), (width, height), &buffer)?;
        }

        Ok(())
    }
}
