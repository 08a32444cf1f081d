use postgis_diesel::types::{MultiPoint, Point};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// WGS84 longitude/latitude.
pub const SRID: u32 = 4326;

const GEOJSON_GEOMETRY_TYPES: &[&str] = &[
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

const INVALID_FORMAT: &str =
    "Invalid format: string or unicode input unrecognized as GeoJSON.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MultiPointType {
    MultiPoint,
}

/// GeoJSON MultiPoint geometry, positions in `[longitude, latitude]` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MultiPointGeometry {
    #[serde(rename = "type")]
    pub kind: MultiPointType,
    #[schema(value_type = Vec<Vec<f64>>)]
    pub coordinates: Vec<[f64; 2]>,
}

impl From<&MultiPoint<Point>> for MultiPointGeometry {
    fn from(value: &MultiPoint<Point>) -> Self {
        Self {
            kind: MultiPointType::MultiPoint,
            coordinates: value.points.iter().map(|p| [p.x, p.y]).collect(),
        }
    }
}

impl MultiPointGeometry {
    pub fn to_multipoint(&self) -> MultiPoint<Point> {
        MultiPoint {
            points: self
                .coordinates
                .iter()
                .map(|[lon, lat]| Point {
                    x: *lon,
                    y: *lat,
                    srid: Some(SRID),
                })
                .collect(),
            srid: Some(SRID),
        }
    }
}

/// Parses a GeoJSON MultiPoint given either as an object or as a string
/// holding one. Returns a user-facing message on failure.
pub fn parse_multipoint(value: &Value) -> Result<MultiPoint<Point>, String> {
    match value {
        Value::Object(_) => parse_geometry_object(value),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(inner @ Value::Object(_)) => parse_geometry_object(&inner),
            _ => Err(INVALID_FORMAT.to_string()),
        },
        _ => Err(INVALID_FORMAT.to_string()),
    }
}

fn parse_geometry_object(value: &Value) -> Result<MultiPoint<Point>, String> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| INVALID_FORMAT.to_string())?;

    if kind != "MultiPoint" {
        return if GEOJSON_GEOMETRY_TYPES.contains(&kind) {
            Err(format!("Expected a MultiPoint geometry, got {kind}."))
        } else {
            Err(INVALID_FORMAT.to_string())
        };
    }

    let positions = value
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| "MultiPoint coordinates must be an array of positions.".to_string())?;
    if positions.is_empty() {
        return Err("MultiPoint must contain at least one position.".to_string());
    }

    let coordinates = positions
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MultiPointGeometry {
        kind: MultiPointType::MultiPoint,
        coordinates,
    }
    .to_multipoint())
}

fn parse_position(value: &Value) -> Result<[f64; 2], String> {
    let invalid = || format!("Invalid position {value}: expected [longitude, latitude].");

    let parts = value.as_array().ok_or_else(invalid)?;
    let [lon, lat] = parts.as_slice() else {
        return Err(invalid());
    };
    let (lon, lat) = match (lon.as_f64(), lat.as_f64()) {
        (Some(lon), Some(lat)) => (lon, lat),
        _ => return Err(invalid()),
    };

    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("Longitude {lon} is outside [-180, 180]."));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Latitude {lat} is outside [-90, 90]."));
    }

    Ok([lon, lat])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_multipoint() {
        let parsed = parse_multipoint(&json!({
            "type": "MultiPoint",
            "coordinates": [[-3.7, 40.4], [2.17, 41.38]]
        }))
        .unwrap();

        assert_eq!(parsed.srid, Some(SRID));
        assert_eq!(parsed.points.len(), 2);
        assert_eq!((parsed.points[0].x, parsed.points[0].y), (-3.7, 40.4));
        assert_eq!((parsed.points[1].x, parsed.points[1].y), (2.17, 41.38));
    }

    #[test]
    fn test_parse_multipoint_from_string() {
        let parsed =
            parse_multipoint(&json!(r#"{"type":"MultiPoint","coordinates":[[10,20]]}"#)).unwrap();

        assert_eq!((parsed.points[0].x, parsed.points[0].y), (10.0, 20.0));
    }

    #[test]
    fn test_parse_rejects_other_geometry_types() {
        let err = parse_multipoint(&json!({"type": "Point", "coordinates": [-3.7, 40.4]}))
            .unwrap_err();
        assert_eq!(err, "Expected a MultiPoint geometry, got Point.");

        let err = parse_multipoint(&json!({"type": "Circle"})).unwrap_err();
        assert_eq!(err, INVALID_FORMAT);
    }

    #[test]
    fn test_parse_rejects_bad_positions() {
        assert!(parse_multipoint(&json!({"type": "MultiPoint", "coordinates": []})).is_err());
        assert!(
            parse_multipoint(&json!({"type": "MultiPoint", "coordinates": [[1.0, 2.0, 3.0]]}))
                .is_err()
        );
        assert!(
            parse_multipoint(&json!({"type": "MultiPoint", "coordinates": [["a", 2.0]]})).is_err()
        );
        assert!(
            parse_multipoint(&json!({"type": "MultiPoint", "coordinates": [[181.0, 0.0]]}))
                .is_err()
        );
        assert!(
            parse_multipoint(&json!({"type": "MultiPoint", "coordinates": [[0.0, -90.5]]}))
                .is_err()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_multipoint(&json!("not json")).unwrap_err(), INVALID_FORMAT);
        assert_eq!(parse_multipoint(&json!(42)).unwrap_err(), INVALID_FORMAT);
    }

    #[test]
    fn test_encode_multipoint() {
        let multipoint = parse_multipoint(&json!({
            "type": "MultiPoint",
            "coordinates": [[-3.7, 40.4]]
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(MultiPointGeometry::from(&multipoint)).unwrap(),
            json!({"type": "MultiPoint", "coordinates": [[-3.7, 40.4]]})
        );
    }
}
