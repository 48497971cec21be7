//! Virtual raster catalog over a batch's output directory.
//!
//! The catalog is built from a directory listing, not from the batch's tile
//! records, so rasters written by earlier (resumed) runs into the same
//! directory are included.

use crate::types::{GeotagError, GeotagResult};
use gdal::programs::raster::build_vrt;
use gdal::Dataset;
use std::path::{Path, PathBuf};

/// Mosaic catalog builder
pub struct MosaicIndex;

impl MosaicIndex {
    /// Catalog filename derived from the output directory's location:
    /// `<grandparent-segment>_<parent-leading-segment>_output.vrt`. The
    /// second segment is the directory's own name truncated at its first
    /// underscore (so `sample_GEOTAGGED` contributes `sample`).
    pub fn catalog_name(output_dir: &Path) -> String {
        let leaf = output_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let leading = leaf.split('_').next().unwrap_or(leaf);

        let parent = output_dir
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("mosaic");

        format!("{}_{}_output.vrt", parent, leading)
    }

    /// Default catalog location: the output directory's parent
    pub fn catalog_path(output_dir: &Path) -> PathBuf {
        let name = Self::catalog_name(output_dir);
        match output_dir.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }

    /// List the georeferenced rasters in `output_dir`, sorted by name
    pub fn list_rasters(output_dir: &Path) -> GeotagResult<Vec<PathBuf>> {
        let mut rasters: Vec<PathBuf> = std::fs::read_dir(output_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("tif"))
                    .unwrap_or(false)
            })
            .collect();
        rasters.sort();
        Ok(rasters)
    }

    /// Build a VRT catalog over every `.tif` in `output_dir`, written to
    /// `catalog_path`. Must only run after all intended writes for the batch
    /// have completed.
    pub fn build(output_dir: &Path, catalog_path: &Path) -> GeotagResult<PathBuf> {
        let rasters = Self::list_rasters(output_dir)?;
        if rasters.is_empty() {
            return Err(GeotagError::EmptyMosaic(output_dir.display().to_string()));
        }

        log::info!(
            "Generating VRT catalog {} over {} rasters",
            catalog_path.display(),
            rasters.len()
        );

        let mut datasets = Vec::with_capacity(rasters.len());
        for raster in &rasters {
            datasets.push(Dataset::open(raster)?);
        }

        let vrt = build_vrt(Some(catalog_path), &datasets, None)?;
        drop(vrt);

        Ok(catalog_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_name_from_segments() {
        let dir = Path::new("/data/larissa/sample_GEOTAGGED");
        assert_eq!(MosaicIndex::catalog_name(dir), "larissa_sample_output.vrt");
        assert_eq!(
            MosaicIndex::catalog_path(dir),
            Path::new("/data/larissa/larissa_sample_output.vrt")
        );
    }

    #[test]
    fn test_catalog_name_without_underscore() {
        let dir = Path::new("/data/trikala/run7");
        assert_eq!(MosaicIndex::catalog_name(dir), "trikala_run7_output.vrt");
    }
}
