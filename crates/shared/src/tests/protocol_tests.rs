use super::*;

#[test]
fn districts_accept_numeric_and_text_ids() {
    let body = br#"[{"id": 3, "name": "Sants-Montjuic"}, {"id": "D7", "name": "Horta-Guinardo"}]"#;
    let districts = parse_districts(body).expect("parse districts");
    assert_eq!(districts.len(), 2);
    assert_eq!(districts[0].id, DistrictId::new("3"));
    assert_eq!(districts[1].id.as_str(), "D7");
    assert_eq!(districts[1].name, "Horta-Guinardo");
}

#[test]
fn districts_reject_blank_id() {
    let err = parse_districts(br#"[{"id": "  ", "name": "Nowhere"}]"#).expect_err("must fail");
    assert!(matches!(
        err,
        ProtocolError::InvalidRecord { index: 0, endpoint: Endpoint::Districts, .. }
    ));
}

#[test]
fn districts_reject_blank_name() {
    let err = parse_districts(br#"[{"id": "D1", "name": ""}, {"id": "D2", "name": "Gracia"}]"#)
        .expect_err("must fail");
    assert!(matches!(
        err,
        ProtocolError::InvalidRecord { index: 0, endpoint: Endpoint::Districts, .. }
    ));
    assert!(err.to_string().contains("empty district name"), "unexpected error: {err}");
}

#[test]
fn population_points_parse_triples() {
    let points = parse_population_points(b"[[41.38, 2.17, 55.0], [41.40, 2.19, 0]]")
        .expect("parse points");
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].position, LatLng::new(41.38, 2.17));
    assert!((points[0].intensity - 55.0).abs() < f64::EPSILON);
    assert!(points[1].intensity.abs() < f64::EPSILON);
}

#[test]
fn population_points_reject_pairs_and_objects() {
    let err = parse_population_points(b"[[41.38, 2.17]]").expect_err("pair must fail");
    assert!(matches!(err, ProtocolError::Json { endpoint: Endpoint::PopulationData, .. }));

    let err = parse_population_points(br#"{"error": "boom"}"#).expect_err("object must fail");
    assert_eq!(err.endpoint(), Endpoint::PopulationData);
}

#[test]
fn population_points_reject_out_of_range_values() {
    let err = parse_population_points(b"[[41.0, 2.0, 1.0], [95.0, 2.0, 1.0]]")
        .expect_err("latitude must fail");
    assert!(matches!(err, ProtocolError::InvalidRecord { index: 1, .. }));

    let err = parse_population_points(b"[[41.0, 2.0, -4.0]]").expect_err("intensity must fail");
    assert!(err.to_string().contains("invalid intensity"));
}

#[test]
fn hotels_parse_location_pairs() {
    let body = br#"[{"name": "Hotel Arts", "district": "Sant Marti", "location": [41.386, 2.196]}]"#;
    let hotels = parse_hotels(body).expect("parse hotels");
    assert_eq!(hotels.len(), 1);
    assert_eq!(hotels[0].name, "Hotel Arts");
    assert_eq!(hotels[0].district, "Sant Marti");
    assert_eq!(hotels[0].location, LatLng::new(41.386, 2.196));
}

#[test]
fn hotels_reject_missing_location() {
    let err = parse_hotels(br#"[{"name": "Hotel Arts", "district": "Sant Marti"}]"#)
        .expect_err("must fail");
    assert!(matches!(err, ProtocolError::Json { endpoint: Endpoint::Hotels, .. }));
}

const SQUARE: &str = r#"{"type": "Polygon", "coordinates": [[[2.10, 41.30], [2.20, 41.30], [2.20, 41.40], [2.10, 41.40], [2.10, 41.30]]]}"#;

#[test]
fn boundary_from_bare_polygon_has_lat_lng_bounds() {
    let boundary = parse_boundary(SQUARE.as_bytes()).expect("parse boundary");
    assert_eq!(boundary.shape.0.len(), 1);
    assert_eq!(boundary.bounds.south_west, LatLng::new(41.30, 2.10));
    assert_eq!(boundary.bounds.north_east, LatLng::new(41.40, 2.20));
    assert!(boundary.bounds.contains(boundary.bounds.center()));
}

#[test]
fn boundary_from_feature_collection_merges_polygons() {
    let body = format!(
        r#"{{"type": "FeatureCollection", "features": [
            {{"type": "Feature", "properties": {{}}, "geometry": {SQUARE}}},
            {{"type": "Feature", "properties": {{}}, "geometry": {{"type": "MultiPolygon", "coordinates": [[[[2.30, 41.20], [2.40, 41.20], [2.40, 41.25], [2.30, 41.20]]]]}}}}
        ]}}"#
    );
    let boundary = parse_boundary(body.as_bytes()).expect("parse boundary");
    assert_eq!(boundary.shape.0.len(), 2);
    assert_eq!(boundary.bounds.south_west, LatLng::new(41.20, 2.10));
    assert_eq!(boundary.bounds.north_east, LatLng::new(41.40, 2.40));
}

#[test]
fn boundary_rejects_point_geometry() {
    let err = parse_boundary(br#"{"type": "Point", "coordinates": [2.1, 41.3]}"#)
        .expect_err("must fail");
    assert!(matches!(err, ProtocolError::UnsupportedGeometry { kind: "Point", .. }));
}

#[test]
fn boundary_rejects_empty_collection() {
    let err = parse_boundary(br#"{"type": "FeatureCollection", "features": []}"#)
        .expect_err("must fail");
    assert!(err.to_string().contains("no polygons"));
}

#[test]
fn population_query_omits_missing_district() {
    let query = PopulationQuery {
        year: 2020,
        district: None,
    };
    assert_eq!(serde_json::to_value(&query).expect("json"), serde_json::json!({"year": 2020}));
    assert_eq!(boundaries_route(), "/api/boundaries");
}
