//! Tile enumeration.

use std::ops::Range;

use geo::{BoundingRect, Intersects, MultiPolygon, Rect};
use tracing::debug;

use crate::coord::TileId;
use crate::geometry::{GeometryError, TileGeometry};

use super::{AreaOfInterest, GridDefinition, GridError, GridSpec};

/// One cell of a grid at a fixed resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    id: TileId,
    geometry: TileGeometry,
    extent: Rect<f64>,
    spec: GridSpec,
}

impl Tile {
    #[inline]
    pub fn id(&self) -> &TileId {
        &self.id
    }

    /// Footprint in the grid CRS.
    #[inline]
    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }

    /// Extent in the grid CRS.
    #[inline]
    pub fn extent(&self) -> Rect<f64> {
        self.extent
    }

    #[inline]
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Pixel dimensions as (width, height).
    #[inline]
    pub fn shape(&self) -> (u32, u32) {
        (self.spec.tile_shape, self.spec.tile_shape)
    }

    pub fn into_parts(self) -> (TileId, TileGeometry) {
        (self.id, self.geometry)
    }
}

/// Enumerates the tiles of a [`GridDefinition`].
#[derive(Debug, Clone)]
pub struct TileGrid {
    definition: GridDefinition,
    simplify_tolerance: Option<f64>,
    buffer: f64,
}

impl TileGrid {
    pub fn new(definition: GridDefinition) -> Self {
        Self {
            definition,
            simplify_tolerance: None,
            buffer: 0.0,
        }
    }

    /// Simplifies areas of interest (in degrees) before matching tiles.
    pub fn with_simplify_tolerance(mut self, tolerance: f64) -> Self {
        self.simplify_tolerance = Some(tolerance).filter(|t| *t > 0.0);
        self
    }

    /// Grows each tile by `buffer` grid units when matching areas of
    /// interest, so tiles just outside an area are kept too.
    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer.max(0.0);
        self
    }

    #[inline]
    pub fn definition(&self) -> &GridDefinition {
        &self.definition
    }

    /// Every tile covering the definition's outer bound, in row-major order.
    pub fn tiles_for(&self, resolution: f64) -> Result<Vec<Tile>, GridError> {
        let spec = self.definition.spec(resolution)?;
        let (cols, rows) = self.index_ranges()?;

        let mut tiles = Vec::with_capacity(cols.len() * rows.len());
        for row in rows {
            for col in cols.clone() {
                tiles.push(self.make_tile(&spec, col, row));
            }
        }

        debug!(
            grid = self.definition.name(),
            resolution,
            tile_shape = spec.tile_shape,
            tiles = tiles.len(),
            "Enumerated grid tiles"
        );
        Ok(tiles)
    }

    /// Tiles overlapping an area of interest, in row-major order.
    pub fn tiles_intersecting(
        &self,
        resolution: f64,
        area: &AreaOfInterest,
    ) -> Result<Vec<Tile>, GridError> {
        let spec = self.definition.spec(resolution)?;

        let degrees = match self.simplify_tolerance {
            Some(tolerance) => area.simplified(tolerance),
            None => area.geometry().clone(),
        };
        let projected = project(&degrees, &self.definition)?;
        let Some(area_extent) = projected.bounding_rect() else {
            return Err(GridError::EmptyArea);
        };

        let (cols, rows) = self.index_ranges()?;
        let mut tiles = Vec::new();
        for row in rows {
            for col in cols.clone() {
                let extent = self.cell_extent(&spec, col, row);
                let buffered = grow(extent, self.buffer);
                if buffered.intersects(&area_extent) && buffered.to_polygon().intersects(&projected)
                {
                    tiles.push(self.make_tile(&spec, col, row));
                }
            }
        }

        debug!(
            grid = self.definition.name(),
            resolution,
            tiles = tiles.len(),
            "Matched tiles to area of interest"
        );
        Ok(tiles)
    }

    /// A single tile by id.
    pub fn tile(&self, id: &TileId, resolution: f64) -> Result<Tile, GridError> {
        let spec = self.definition.spec(resolution)?;
        match id {
            TileId::Grid { col, row } => Ok(self.make_tile(&spec, *col, *row)),
            other => Err(GridError::UnsupportedTileId(other.clone())),
        }
    }

    /// Column and row index ranges covering the outer bound.
    fn index_ranges(&self) -> Result<(Range<i32>, Range<i32>), GridError> {
        let bounds = self.definition.bounds();
        let crs = self.definition.crs();
        let (ax, ay) = crs
            .from_geographic(bounds.min_x(), bounds.min_y())
            .map_err(GeometryError::from)?;
        let (bx, by) = crs
            .from_geographic(bounds.max_x(), bounds.max_y())
            .map_err(GeometryError::from)?;

        let (ox, oy) = self.definition.origin();
        let side = self.definition.tile_side();
        let index = |lo: f64, hi: f64, origin: f64| -> Range<i32> {
            let start = ((lo.min(hi) - origin) / side).floor() as i32;
            let end = ((lo.max(hi) - origin) / side).ceil() as i32;
            start..end
        };
        Ok((index(ax, bx, ox), index(ay, by, oy)))
    }

    fn cell_extent(&self, spec: &GridSpec, col: i32, row: i32) -> Rect<f64> {
        let side = spec.tile_side();
        let x0 = spec.origin.0 + col as f64 * side;
        let y0 = spec.origin.1 + row as f64 * side;
        Rect::new(
            geo::coord! { x: x0, y: y0 },
            geo::coord! { x: x0 + side, y: y0 + side },
        )
    }

    fn make_tile(&self, spec: &GridSpec, col: i32, row: i32) -> Tile {
        let extent = self.cell_extent(spec, col, row);
        Tile {
            id: TileId::grid(col, row),
            geometry: TileGeometry::new(extent.to_polygon(), spec.crs),
            extent,
            spec: *spec,
        }
    }
}

fn grow(rect: Rect<f64>, by: f64) -> Rect<f64> {
    if by == 0.0 {
        return rect;
    }
    Rect::new(
        geo::coord! { x: rect.min().x - by, y: rect.min().y - by },
        geo::coord! { x: rect.max().x + by, y: rect.max().y + by },
    )
}

fn project(
    area: &MultiPolygon<f64>,
    definition: &GridDefinition,
) -> Result<MultiPolygon<f64>, GridError> {
    let geometry = TileGeometry::geographic(area.clone()).to_crs(definition.crs())?;
    match geometry.geometry() {
        geo::Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        _ => Err(GridError::EmptyArea),
    }
}
