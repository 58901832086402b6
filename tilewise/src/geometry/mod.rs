//! Tile geometries and geometry repair.
//!
//! A [`TileGeometry`] is the footprint of one unit of work: a `geo` geometry
//! tagged with the CRS it is expressed in. Grids create them in their
//! projected CRS; the antimeridian splitter moves them to degrees.

mod features;
mod fix;

pub use features::{feature_polygons, parse_features, property_string};
pub use fix::{fix, ring_self_intersects};

use geo::{BoundingRect, Geometry, MapCoords, Rect};
use thiserror::Error;

use crate::proj::{Crs, ProjError};

/// Errors raised while repairing or reprojecting geometries.
#[derive(Debug, Error, Clone)]
pub enum GeometryError {
    /// Geometry type has no meaningful repair (points, multipoints)
    #[error("unsupported geometry type: {0}")]
    Unsupported(&'static str),

    /// Geometry has no coordinates to derive an extent from
    #[error("geometry is empty")]
    Empty,

    /// Reprojection failed
    #[error("reprojection failed: {0}")]
    Projection(#[from] ProjError),

    /// Derived extent is not a valid box (NaN or inverted latitudes)
    #[error("invalid extent: {0}")]
    InvalidExtent(String),

    /// GeoJSON input could not be converted
    #[error("invalid GeoJSON: {0}")]
    GeoJson(String),
}

/// Footprint of a tile together with its coordinate reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGeometry {
    geometry: Geometry<f64>,
    crs: Crs,
}

impl TileGeometry {
    pub fn new(geometry: impl Into<Geometry<f64>>, crs: Crs) -> Self {
        Self {
            geometry: geometry.into(),
            crs,
        }
    }

    /// Convenience constructor for a geographic (EPSG:4326) geometry.
    pub fn geographic(geometry: impl Into<Geometry<f64>>) -> Self {
        Self::new(geometry, Crs::Wgs84)
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    #[inline]
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Reprojects into `target`. Longitudes are not wrapped.
    pub fn to_crs(&self, target: Crs) -> Result<TileGeometry, GeometryError> {
        if self.crs == target {
            return Ok(self.clone());
        }
        let source = self.crs;
        let geometry = self.geometry.try_map_coords(|c| {
            source
                .transform_to(target, c.x, c.y)
                .map(|(x, y)| geo::coord! { x: x, y: y })
        })?;
        Ok(TileGeometry {
            geometry,
            crs: target,
        })
    }

    /// Reprojects into geographic degrees.
    pub fn to_geographic(&self) -> Result<TileGeometry, GeometryError> {
        self.to_crs(Crs::Wgs84)
    }

    /// Extent in the geometry's own CRS.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

/// Short name of a geometry variant, for error messages.
pub(crate) fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_to_geographic_from_pdc() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 96_000.0, y: 0.0),
            (x: 96_000.0, y: 96_000.0),
            (x: 0.0, y: 96_000.0),
            (x: 0.0, y: 0.0),
        ];
        let tile = TileGeometry::new(square, Crs::PdcMercator);
        let geographic = tile.to_geographic().unwrap();
        assert_eq!(geographic.crs(), Crs::Wgs84);

        let rect = geographic.bounding_rect().unwrap();
        assert!((rect.min().x - 150.0).abs() < 1e-9);
        assert!(rect.max().x > 150.8 && rect.max().x < 150.9);
        assert!(rect.min().y.abs() < 1e-9);
    }

    #[test]
    fn test_to_crs_same_crs_is_identity() {
        let tile = TileGeometry::geographic(geo::point!(x: 1.0, y: 2.0));
        assert_eq!(tile.to_crs(Crs::Wgs84).unwrap(), tile);
    }

    #[test]
    fn test_to_crs_surfaces_projection_errors() {
        let tile = TileGeometry::geographic(geo::point!(x: 0.0, y: 90.0));
        assert!(matches!(
            tile.to_crs(Crs::PdcMercator),
            Err(GeometryError::Projection(_))
        ));
    }
}
