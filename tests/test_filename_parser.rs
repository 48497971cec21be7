use geotagger::core::geo;
use geotagger::{GeoPoint, GeoReferencer, GeotagError, GroundSample};

#[test]
fn test_reference_filename() {
    let center = GeoReferencer::parse_center_from_name("IMG0007_LT-12.25_LG45.5.png").unwrap();
    assert_eq!(center, GeoPoint::new(-12.25, 45.5));
}

#[test]
fn test_round_trip_through_naming_scheme() {
    // Formatting and re-parsing must reproduce the exact same floats
    let cases = [
        GeoPoint::new(-12.25, 45.5),
        GeoPoint::new(39.5, 22.1),
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(-89.999999, 179.999999),
        GeoPoint::new(41.123456789, -3.987654321),
    ];
    for center in cases {
        let name = geo::tile_file_name("IMG", 42, center, "png");
        let parsed = GeoReferencer::parse_center_from_name(&name).unwrap();
        assert_eq!(parsed.lat.to_bits(), center.lat.to_bits(), "lat of {}", name);
        assert_eq!(parsed.lon.to_bits(), center.lon.to_bits(), "lon of {}", name);
    }
}

#[test]
fn test_malformed_names_are_reported() {
    let bad = [
        "IMG0007.png",
        "IMG0007_LG45.5_LT-12.25.png", // markers swapped
        "IMG0007_LT_LG45.5.png",       // empty latitude
        "IMG0007_LT12.25_LG.png",      // empty longitude
        "LT12.25_LG45.5.png",          // missing id token
        "IMG0007_LT200.0_LG45.5.png",  // latitude outside WGS84 range
    ];
    for name in bad {
        let result = GeoReferencer::parse_center_from_name(name);
        assert!(
            matches!(result, Err(GeotagError::MalformedFilename(_))),
            "{} should fail to parse",
            name
        );
    }
}

#[test]
fn test_id_token_parsing() {
    let gsd = GroundSample::square(0.17475);
    let tile = GeoReferencer::tile_from_path(0, "IMG0123_LT1.5_LG2.5.png", gsd).unwrap();
    assert_eq!(tile.id, 123);
    assert_eq!(tile.center, GeoPoint::new(1.5, 2.5));
    assert_eq!(tile.gsd, gsd);
}
