//! Spherical-earth offset math for tile footprints.
//!
//! All conversions use the WGS84 equatorial radius on a spherical
//! approximation, which is accurate to well under a pixel at the ground
//! sample distances this tool works with.

use crate::types::{BoundingBox, CornerSet, GeoPoint, GeotagError, GeotagResult};

/// Earth radius (sphere), meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Offset a center point by planar north/east distances in meters.
///
/// Returns `DegenerateCoordinate` at the poles, where the east/west term
/// divides by cos(lat) = 0.
pub fn offset_to_geo(center: GeoPoint, north_m: f64, east_m: f64) -> GeotagResult<GeoPoint> {
    if center.lat.abs() >= 90.0 {
        return Err(GeotagError::DegenerateCoordinate(center.lat));
    }

    let d_lat = north_m / EARTH_RADIUS_M;
    let d_lon = east_m / (EARTH_RADIUS_M * (center.lat.to_radians()).cos());

    Ok(GeoPoint {
        lat: center.lat + d_lat.to_degrees(),
        lon: center.lon + d_lon.to_degrees(),
    })
}

/// Compute the four footprint corners of a tile centered at `center`.
///
/// `half_north_m` / `half_east_m` are half the ground extent on each axis.
/// The bottom corners then get an aspect-ratio latitude correction of
/// `(top_right.lat - top_left.lat) * (height / width)`. This adjustment is
/// part of the placement contract for tiles produced by the acquisition
/// pipeline and must not be removed.
pub fn compute_corners(
    center: GeoPoint,
    width_px: usize,
    height_px: usize,
    half_north_m: f64,
    half_east_m: f64,
) -> GeotagResult<CornerSet> {
    let top_left = offset_to_geo(center, half_north_m, -half_east_m)?;
    let top_right = offset_to_geo(center, half_north_m, half_east_m)?;
    let bottom_right = offset_to_geo(center, -half_north_m, half_east_m)?;
    let bottom_left = offset_to_geo(center, -half_north_m, -half_east_m)?;

    let lat_diff = (top_right.lat - top_left.lat) * (height_px as f64 / width_px as f64);

    Ok(CornerSet {
        top_left,
        top_right,
        bottom_right: GeoPoint::new(bottom_right.lat - lat_diff, bottom_right.lon),
        bottom_left: GeoPoint::new(bottom_left.lat - lat_diff, bottom_left.lon),
        altitude: 0.0,
    })
}

/// Max/min reduction of a corner set into (north, south, west, east)
pub fn bounding_box(corners: &CornerSet) -> BoundingBox {
    let points = corners.points();
    let mut north = f64::NEG_INFINITY;
    let mut south = f64::INFINITY;
    let mut west = f64::INFINITY;
    let mut east = f64::NEG_INFINITY;

    for p in points {
        north = north.max(p.lat);
        south = south.min(p.lat);
        west = west.min(p.lon);
        east = east.max(p.lon);
    }

    BoundingBox { north, south, west, east }
}

/// Build a tile filename following the acquisition naming convention:
/// `<prefix><4-digit id>_LT<lat>_LG<lon>.<ext>`, e.g.
/// `IMG0007_LT-12.25_LG45.5.png`.
///
/// Latitude and longitude use the shortest decimal representation that
/// round-trips, so parsing the name back reproduces the same floats exactly.
pub fn tile_file_name(prefix: &str, id: u32, center: GeoPoint, ext: &str) -> String {
    format!("{}{:04}_LT{}_LG{}.{}", prefix, id, center.lat, center.lon, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_offset_north_increases_latitude() {
        let center = GeoPoint::new(10.0, 20.0);
        let moved = offset_to_geo(center, 1000.0, 0.0).unwrap();
        assert!(moved.lat > center.lat);
        assert_relative_eq!(moved.lon, center.lon);
    }

    #[test]
    fn test_offset_rejects_pole() {
        let pole = GeoPoint::new(90.0, 0.0);
        let result = offset_to_geo(pole, 0.0, 100.0);
        assert!(matches!(result, Err(GeotagError::DegenerateCoordinate(_))));
    }

    #[test]
    fn test_corners_symmetric_in_longitude_at_equator() {
        let center = GeoPoint::new(0.0, 45.0);
        let corners = compute_corners(center, 1024, 768, 67.104, 89.472).unwrap();

        let left_offset = center.lon - corners.top_left.lon;
        let right_offset = corners.top_right.lon - center.lon;
        assert_relative_eq!(left_offset, right_offset, epsilon = 1e-12);

        let left_offset = center.lon - corners.bottom_left.lon;
        let right_offset = corners.bottom_right.lon - center.lon;
        assert_relative_eq!(left_offset, right_offset, epsilon = 1e-12);
    }

    #[test]
    fn test_aspect_correction_matches_top_row_difference() {
        // The naive bottom corners differ from the corrected ones by exactly
        // (top_right.lat - top_left.lat) * (height / width).
        let center = GeoPoint::new(39.5, 22.1);
        let (w, h) = (1024usize, 768usize);
        let corners = compute_corners(center, w, h, 67.104, 89.472).unwrap();

        let naive_bottom = offset_to_geo(center, -67.104, 89.472).unwrap();
        let expected_diff =
            (corners.top_right.lat - corners.top_left.lat) * (h as f64 / w as f64);
        assert_relative_eq!(
            naive_bottom.lat - corners.bottom_right.lat,
            expected_diff,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_bounding_box_reduction() {
        let corners = compute_corners(GeoPoint::new(39.5, 22.1), 1024, 768, 67.104, 89.472)
            .unwrap();
        let bbox = bounding_box(&corners);

        assert!(bbox.north >= bbox.south);
        assert!(bbox.east >= bbox.west);
        assert_relative_eq!(bbox.north, corners.top_left.lat);
        assert_relative_eq!(bbox.west, corners.top_left.lon);
        assert_relative_eq!(bbox.east, corners.top_right.lon);
    }

    #[test]
    fn test_tile_file_name_format() {
        let name = tile_file_name("IMG", 7, GeoPoint::new(-12.25, 45.5), "png");
        assert_eq!(name, "IMG0007_LT-12.25_LG45.5.png");
    }
}
