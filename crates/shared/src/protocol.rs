use std::fmt;

use geo::{BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use geojson::{GeoJson, Geometry, Value};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    domain::{DistrictId, LatLng, LatLngBounds},
    error::ProtocolError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Districts,
    PopulationData,
    Boundaries,
    Hotels,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Districts => districts_route(),
            Self::PopulationData => population_data_route(),
            Self::Boundaries => "/api/boundaries/{district}",
            Self::Hotels => hotels_route(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub fn districts_route() -> &'static str {
    "/api/districts"
}

pub fn population_data_route() -> &'static str {
    "/api/population-data"
}

/// Collection route; the district id is appended as one encoded path segment.
pub fn boundaries_route() -> &'static str {
    "/api/boundaries"
}

pub fn hotels_route() -> &'static str {
    "/api/hotels"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationQuery {
    pub year: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<DistrictId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub id: DistrictId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationPoint {
    pub position: LatLng,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub name: String,
    pub district: String,
    pub location: LatLng,
}

/// A district outline. Always carries at least one polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub source: GeoJson,
    pub shape: MultiPolygon<f64>,
    pub bounds: LatLngBounds,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Deserialize)]
struct RawDistrict {
    id: RawId,
    name: String,
}

type RawPoint = (f64, f64, f64);

#[derive(Debug, Deserialize)]
struct RawHotel {
    name: String,
    district: String,
    location: (f64, f64),
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(body).map_err(|source| ProtocolError::Json { endpoint, source })
}

pub fn parse_districts(body: &[u8]) -> Result<Vec<District>, ProtocolError> {
    let endpoint = Endpoint::Districts;
    let raw: Vec<RawDistrict> = decode(endpoint, body)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, district)| {
            let id = match district.id {
                RawId::Text(text) => text.trim().to_string(),
                RawId::Number(number) => number.to_string(),
            };
            if id.is_empty() {
                return Err(ProtocolError::invalid_record(endpoint, index, "empty district id"));
            }
            if district.name.trim().is_empty() {
                return Err(ProtocolError::invalid_record(endpoint, index, "empty district name"));
            }
            Ok(District {
                id: DistrictId(id),
                name: district.name,
            })
        })
        .collect()
}

pub fn parse_population_points(body: &[u8]) -> Result<Vec<PopulationPoint>, ProtocolError> {
    let endpoint = Endpoint::PopulationData;
    let raw: Vec<RawPoint> = decode(endpoint, body)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, (lat, lng, intensity))| {
            let position = LatLng::new(lat, lng);
            if !position.is_valid() {
                return Err(ProtocolError::invalid_record(
                    endpoint,
                    index,
                    format!("position out of range: [{lat}, {lng}]"),
                ));
            }
            if !intensity.is_finite() || intensity < 0.0 {
                return Err(ProtocolError::invalid_record(
                    endpoint,
                    index,
                    format!("invalid intensity {intensity}"),
                ));
            }
            Ok(PopulationPoint {
                position,
                intensity,
            })
        })
        .collect()
}

pub fn parse_hotels(body: &[u8]) -> Result<Vec<Hotel>, ProtocolError> {
    let endpoint = Endpoint::Hotels;
    let raw: Vec<RawHotel> = decode(endpoint, body)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, hotel)| {
            let (lat, lng) = hotel.location;
            let location = LatLng::new(lat, lng);
            if !location.is_valid() {
                return Err(ProtocolError::invalid_record(
                    endpoint,
                    index,
                    format!("location out of range: [{lat}, {lng}]"),
                ));
            }
            if hotel.name.trim().is_empty() {
                return Err(ProtocolError::invalid_record(endpoint, index, "empty hotel name"));
            }
            Ok(Hotel {
                name: hotel.name,
                district: hotel.district,
                location,
            })
        })
        .collect()
}

/// Accepts a bare geometry, a feature or a feature collection, as long as
/// every geometry in it is a polygon or multipolygon.
pub fn parse_boundary(body: &[u8]) -> Result<Boundary, ProtocolError> {
    let source: GeoJson = decode(Endpoint::Boundaries, body)?;

    let mut polygons = Vec::new();
    match &source {
        GeoJson::Geometry(geometry) => collect_polygons(geometry, &mut polygons)?,
        GeoJson::Feature(feature) => {
            let geometry = feature
                .geometry
                .as_ref()
                .ok_or_else(|| ProtocolError::invalid_geometry("feature has no geometry"))?;
            collect_polygons(geometry, &mut polygons)?;
        }
        GeoJson::FeatureCollection(collection) => {
            for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_polygons(geometry, &mut polygons)?;
            }
        }
    }

    let shape = MultiPolygon::new(polygons);
    let rect = shape
        .bounding_rect()
        .ok_or_else(|| ProtocolError::invalid_geometry("boundary contains no polygons"))?;
    // geojson positions are [lng, lat], so x is longitude
    let bounds = LatLngBounds {
        south_west: LatLng::new(rect.min().y, rect.min().x),
        north_east: LatLng::new(rect.max().y, rect.max().x),
    };

    Ok(Boundary {
        source,
        shape,
        bounds,
    })
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon<f64>>) -> Result<(), ProtocolError> {
    match &geometry.value {
        Value::Polygon(rings) => out.push(polygon_from_rings(rings)?),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(polygon_from_rings(rings)?);
            }
        }
        Value::GeometryCollection(members) => {
            for member in members {
                collect_polygons(member, out)?;
            }
        }
        other => {
            return Err(ProtocolError::UnsupportedGeometry {
                endpoint: Endpoint::Boundaries,
                kind: geometry_kind(other),
            })
        }
    }
    Ok(())
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, ProtocolError> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| ProtocolError::invalid_geometry("polygon has no rings"))?;
    let interiors = interiors
        .iter()
        .map(|ring| ring_to_line_string(ring))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(ring_to_line_string(exterior)?, interiors))
}

fn ring_to_line_string(ring: &[Vec<f64>]) -> Result<LineString<f64>, ProtocolError> {
    if ring.len() < 4 {
        return Err(ProtocolError::invalid_geometry(format!(
            "linear ring needs at least 4 positions, got {}",
            ring.len()
        )));
    }
    let coords = ring
        .iter()
        .map(|position| match position.as_slice() {
            [lng, lat, ..] if LatLng::new(*lat, *lng).is_valid() => Ok(Coord { x: *lng, y: *lat }),
            _ => Err(ProtocolError::invalid_geometry(format!(
                "invalid position {position:?}"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
