//! Coordinate reference systems used by tile grids.
//!
//! Grids are laid out in a projected plane while catalog searches take
//! geographic degrees, so every tile geometry carries its [`Crs`] and can be
//! moved between the two. Only the handful of systems the grids need are
//! supported; each is a closed-form projection on the WGS84 ellipsoid.

mod ellipsoid;
mod mercator;

pub use ellipsoid::{Ellipsoid, WGS84};
pub use mercator::Mercator;

use std::fmt;
use thiserror::Error;

/// Errors from coordinate transforms.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjError {
    #[error("Transform failed: {0}")]
    TransformFailed(String),
}

/// Trait for map projections supporting forward and inverse transforms.
///
/// Angles are in degrees. Inverse longitudes are NOT wrapped: a projection
/// centred on 150°E returns 210° rather than -150° for points east of the
/// antimeridian, which keeps extents continuous across it.
pub trait Projection: Send + Sync {
    /// Forward: (lon, lat) degrees -> (easting, northing)
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError>;

    /// Inverse: (easting, northing) -> (lon, lat) degrees
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError>;
}

/// A supported coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// WGS84 geographic, degrees (EPSG:4326)
    Wgs84,
    /// WGS 84 / PDC Mercator, centred on 150°E (EPSG:3832)
    PdcMercator,
}

impl Crs {
    /// Returns the EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::PdcMercator => 3832,
        }
    }

    /// Converts a coordinate in this CRS to geographic degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        match self {
            Crs::Wgs84 => Ok((x, y)),
            Crs::PdcMercator => Mercator::pdc().inverse(x, y),
        }
    }

    /// Converts geographic degrees to a coordinate in this CRS.
    pub fn from_geographic(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        match self {
            Crs::Wgs84 => Ok((lon, lat)),
            Crs::PdcMercator => Mercator::pdc().forward(lon, lat),
        }
    }

    /// Transforms a coordinate from this CRS into `target`.
    pub fn transform_to(&self, target: Crs, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        if *self == target {
            return Ok((x, y));
        }
        let (lon, lat) = self.to_geographic(x, y)?;
        target.from_geographic(lon, lat)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}
