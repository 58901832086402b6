//! Areas of interest.

use std::path::Path;

use geo::{BooleanOps, BoundingRect, MultiPolygon, Polygon, Simplify};
use tracing::{debug, info};

use crate::coord::BoundingBox;
use crate::geometry::{feature_polygons, parse_features, property_string};

use super::GridError;

/// A region to restrict tiling to, in geographic degrees.
///
/// Input polygons are dissolved once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    geometry: MultiPolygon<f64>,
}

impl AreaOfInterest {
    pub fn new(polygons: impl IntoIterator<Item = Polygon<f64>>) -> Result<Self, GridError> {
        let polygons: Vec<Polygon<f64>> = polygons.into_iter().collect();
        if polygons.is_empty() {
            return Err(GridError::EmptyArea);
        }
        let dissolved = MultiPolygon::new(polygons).union(&MultiPolygon::new(Vec::new()));
        if dissolved.0.is_empty() {
            return Err(GridError::EmptyArea);
        }
        Ok(Self {
            geometry: dissolved,
        })
    }

    /// Reads areal features from a GeoJSON document.
    ///
    /// With `filter = Some((key, value))` only features whose property `key`
    /// equals `value` are kept, e.g. `("GID_0", "FJI")` for one country.
    pub fn from_geojson(text: &str, filter: Option<(&str, &str)>) -> Result<Self, GridError> {
        let features = parse_features(text)?;
        let total = features.len();

        let mut polygons = Vec::new();
        let mut matched = 0usize;
        for feature in &features {
            if let Some((key, value)) = filter {
                if property_string(feature, key).as_deref() != Some(value) {
                    continue;
                }
            }
            matched += 1;
            polygons.extend(feature_polygons(feature)?);
        }

        debug!(
            features = total,
            matched,
            polygons = polygons.len(),
            "Read area of interest"
        );
        Self::new(polygons)
    }

    pub fn from_geojson_file(path: &Path, filter: Option<(&str, &str)>) -> Result<Self, GridError> {
        let text = std::fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let area = Self::from_geojson(&text, filter)?;
        info!(path = %path.display(), "Loaded area of interest");
        Ok(area)
    }

    #[inline]
    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Extent in degrees.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let rect = self.geometry.bounding_rect()?;
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y).ok()
    }

    /// Douglas-Peucker simplified copy, tolerance in degrees.
    pub(crate) fn simplified(&self, tolerance: f64) -> MultiPolygon<f64> {
        let simplified = self.geometry.simplify(&tolerance);
        // Tiny islands can collapse entirely; keep the original then
        if simplified.0.iter().all(|p| p.exterior().0.len() < 4) {
            self.geometry.clone()
        } else {
            simplified
        }
    }
}
