//! GeoJSON feature reading.

use geo::{Geometry, Polygon};
use geojson::{Feature, GeoJson};

use super::GeometryError;

/// Parses a GeoJSON document into its features.
///
/// A bare geometry or single feature is accepted and returned as a
/// one-element list.
pub fn parse_features(text: &str) -> Result<Vec<Feature>, GeometryError> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| GeometryError::GeoJson(e.to_string()))?;

    Ok(match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    })
}

/// Returns the polygons of a feature's geometry.
///
/// Non-areal geometries contribute nothing.
pub fn feature_polygons(feature: &Feature) -> Result<Vec<Polygon<f64>>, GeometryError> {
    let Some(geometry) = feature.geometry.clone() else {
        return Ok(Vec::new());
    };
    let geometry = Geometry::<f64>::try_from(geometry)
        .map_err(|e| GeometryError::GeoJson(e.to_string()))?;

    let mut polygons = Vec::new();
    push_polygons(geometry, &mut polygons);
    Ok(polygons)
}

fn push_polygons(geometry: Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p),
        Geometry::MultiPolygon(mp) => out.extend(mp.0),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in gc.0 {
                push_polygons(g, out);
            }
        }
        _ => {}
    }
}

/// Reads a feature property as a string, rendering numbers without quotes.
pub fn property_string(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
