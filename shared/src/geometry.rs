use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Geographic position in degrees. Serializes as `{ "lng": .., "lat": .. }`,
/// the shape map engines hand out on pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// A GeoJSON position: `[lng, lat]` with an optional altitude.
pub type Position = Vec<f64>;

/// Typed GeoJSON geometry, tagged by its `type` member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// First vertex of the geometry, used to anchor popups.
    /// Empty parts at any nesting level yield `None`.
    pub fn representative_coordinate(&self) -> Option<LngLat> {
        let first = match self {
            Self::Point(position) => Some(position),
            Self::MultiPoint(positions) | Self::LineString(positions) => positions.first(),
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                lines.first().and_then(|line| line.first())
            }
            Self::MultiPolygon(polygons) => polygons
                .first()
                .and_then(|rings| rings.first())
                .and_then(|ring| ring.first()),
        }?;
        pair_from_position(first)
    }

    /// Parse from raw JSON. Returns `None` for unknown kinds or malformed payloads.
    pub fn from_json(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

fn pair_from_position(position: &[f64]) -> Option<LngLat> {
    match position {
        [lng, lat, ..] => Some(LngLat::new(*lng, *lat)),
        _ => None,
    }
}

/// Representative coordinate of an untyped geometry object.
///
/// Accepts whatever the map engine reports for a picked feature, so nothing
/// about the shape is assumed:
/// - a `Point` yields its own position (altitude ignored);
/// - any other kind with an array `coordinates` member yields its first
///   vertex, found by descending into the first element while it is an array;
/// - absent, non-object, malformed, empty or non-numeric payloads yield `None`.
pub fn coordinates_from_geometry(geometry: Option<&Value>) -> Option<LngLat> {
    let object = geometry?.as_object()?;
    let mut coords = object.get("coordinates")?.as_array()?;

    if object.get("type").and_then(Value::as_str) != Some("Point") {
        while let Some(Value::Array(inner)) = coords.first() {
            coords = inner;
        }
    }

    match coords.as_slice() {
        [lng, lat, ..] => Some(LngLat::new(lng.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}
