//! Grid definitions and resolution-specific specs.

use crate::coord::BoundingBox;
use crate::proj::Crs;

use super::GridError;

/// Slack allowed when checking that a resolution divides the tile side.
const DIVISIBILITY_TOLERANCE: f64 = 1e-9;

/// A logical grid, independent of pixel resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    name: String,
    crs: Crs,
    origin: (f64, f64),
    tile_side: f64,
    bounds: BoundingBox,
}

impl GridDefinition {
    /// Creates a grid definition.
    ///
    /// `bounds` is the outer geographic extent in degrees; its east edge may
    /// lie past 180° for grids that span the antimeridian.
    pub fn new(
        name: impl Into<String>,
        crs: Crs,
        origin: (f64, f64),
        tile_side: f64,
        bounds: BoundingBox,
    ) -> Self {
        Self {
            name: name.into(),
            crs,
            origin,
            tile_side,
            bounds,
        }
    }

    /// Pacific grid: PDC Mercator, 96 km tiles, 120°E to 80°W, 30°S to 30°N.
    pub fn pacific() -> Self {
        Self {
            name: "pacific".to_string(),
            crs: Crs::PdcMercator,
            origin: (-3_000_000.0, -4_000_000.0),
            tile_side: 96_000.0,
            bounds: BoundingBox::from_ordered(120.0, -30.0, 280.0, 30.0),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn crs(&self) -> Crs {
        self.crs
    }

    #[inline]
    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Tile side length in CRS units.
    #[inline]
    pub fn tile_side(&self) -> f64 {
        self.tile_side
    }

    #[inline]
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Fixes the pixel resolution.
    ///
    /// Fails unless the tile side is a whole number of pixels, so every
    /// resolution of one definition yields identical tile footprints.
    pub fn spec(&self, resolution: f64) -> Result<GridSpec, GridError> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(GridError::InvalidResolution(resolution));
        }
        let pixels = self.tile_side / resolution;
        if (pixels - pixels.round()).abs() > DIVISIBILITY_TOLERANCE * pixels.max(1.0) {
            return Err(GridError::ResolutionMismatch {
                resolution,
                tile_side: self.tile_side,
            });
        }
        Ok(GridSpec {
            crs: self.crs,
            origin: self.origin,
            tile_shape: pixels.round() as u32,
            resolution,
        })
    }
}

/// A grid at one pixel resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub crs: Crs,
    pub origin: (f64, f64),
    /// Pixels along each tile side
    pub tile_shape: u32,
    /// CRS units per pixel
    pub resolution: f64,
}

impl GridSpec {
    /// Tile side length in CRS units.
    #[inline]
    pub fn tile_side(&self) -> f64 {
        self.tile_shape as f64 * self.resolution
    }
}
