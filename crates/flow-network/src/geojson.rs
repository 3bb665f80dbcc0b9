//! GeoJSON FeatureCollection adapter.
//!
//! Reads road networks exported as GeoJSON (typically from SUMO or OSM
//! tooling).  Only `LineString` geometries become polylines; every other
//! geometry kind is kept as [`FeatureGeometry::Other`] so the builder can skip
//! it.
//!
//! # Property lookup
//!
//! | Attribute      | Keys tried, in order                       |
//! |----------------|--------------------------------------------|
//! | class          | `edge_type`, `road_type`, `highway`        |
//! | name           | `name`, `road_name`                        |
//! | speed (km/h)   | `maxspeed`; else `speed` (m/s) × 3.6       |
//! | lane width     | `width`, `lane_width`                      |
//! | priority       | `priority`                                 |
//! | allowed        | `allowed` (space-separated string or array)|
//!
//! Numeric values may be JSON numbers or numeric strings.

use geojson::{GeoJson, Value};
use log::{info, warn};
use serde_json::{Map, Value as JsonValue};

use flow_core::{Coordinate, VehicleClass};

use crate::feature::{DEFAULT_SPEED_KMH, FeatureGeometry, RoadAttributes, RoadClass, RoadFeature};
use crate::network::{NetworkGraph, build_network};
use crate::{NetworkError, NetworkResult};

type Properties = Map<String, JsonValue>;

/// Parse a GeoJSON document into road features.
///
/// Accepts a FeatureCollection or a single Feature.  A bare Geometry is
/// rejected.
pub fn features_from_str(text: &str) -> NetworkResult<Vec<RoadFeature>> {
    let doc = text
        .parse::<GeoJson>()
        .map_err(|e| NetworkError::GeoJson(e.to_string()))?;

    let raw = match doc {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(NetworkError::GeoJson("expected a Feature or FeatureCollection".into()));
        }
    };

    let features: Vec<RoadFeature> = raw.iter().map(road_feature).collect();
    let lines = features.iter().filter(|f| f.polyline().is_some()).count();
    if lines < features.len() {
        warn!("{} of {} GeoJSON features are not usable polylines", features.len() - lines, features.len());
    }
    Ok(features)
}

/// Parse and build in one call.
pub fn load_network_from_str(text: &str) -> NetworkResult<NetworkGraph> {
    let features = features_from_str(text)?;
    info!("loaded {} GeoJSON features", features.len());
    Ok(build_network(&features))
}

fn road_feature(feature: &geojson::Feature) -> RoadFeature {
    let geometry = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::LineString(positions)) => line_string(positions),
        Some(Value::Point(p)) => match position(p) {
            Some(c) => FeatureGeometry::Point(c),
            None => FeatureGeometry::Other("Point".into()),
        },
        Some(Value::MultiPoint(_))         => FeatureGeometry::Other("MultiPoint".into()),
        Some(Value::MultiLineString(_))    => FeatureGeometry::Other("MultiLineString".into()),
        Some(Value::Polygon(_))            => FeatureGeometry::Other("Polygon".into()),
        Some(Value::MultiPolygon(_))       => FeatureGeometry::Other("MultiPolygon".into()),
        Some(Value::GeometryCollection(_)) => FeatureGeometry::Other("GeometryCollection".into()),
        None                               => FeatureGeometry::Other("null".into()),
    };

    let attributes = match &feature.properties {
        Some(props) => attributes(props),
        None => RoadAttributes::default(),
    };

    RoadFeature { geometry, attributes }
}

fn position(p: &[f64]) -> Option<Coordinate> {
    match p {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some(Coordinate::new(*lon, *lat)),
        _ => None,
    }
}

fn line_string(positions: &[Vec<f64>]) -> FeatureGeometry {
    let coords: Option<Vec<Coordinate>> = positions.iter().map(|p| position(p)).collect();
    match coords {
        Some(coords) => FeatureGeometry::LineString(coords),
        None => FeatureGeometry::Other("malformed LineString".into()),
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

fn attributes(props: &Properties) -> RoadAttributes {
    let class = str_prop(props, &["edge_type", "road_type", "highway"])
        .map(RoadClass::parse)
        .unwrap_or_default();

    let speed_kmh = f64_prop(props, &["maxspeed"])
        .or_else(|| f64_prop(props, &["speed"]).map(|mps| mps * 3.6))
        .filter(|v| *v > 0.0)
        .unwrap_or(DEFAULT_SPEED_KMH);

    let allowed = match props.get("allowed") {
        Some(JsonValue::String(s)) => VehicleClass::parse_list(s),
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(VehicleClass::parse)
            .collect(),
        _ => Vec::new(),
    };

    RoadAttributes {
        class,
        speed_kmh,
        name:         str_prop(props, &["name", "road_name"]).map(str::to_string),
        lane_width_m: f64_prop(props, &["width", "lane_width"]),
        priority:     f64_prop(props, &["priority"]).map(|p| p.round() as i32),
        allowed,
    }
}

/// First non-empty string among `keys`.
fn str_prop<'a>(props: &'a Properties, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| props.get(*k).and_then(JsonValue::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// First finite number among `keys`, accepting numeric strings.
fn f64_prop(props: &Properties, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|k| match props.get(*k)? {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .find(|v| v.is_finite())
}
