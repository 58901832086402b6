//! Antimeridian-safe search bounds.
//!
//! Catalog APIs take `[west, south, east, north]` boxes that must not wrap.
//! A tile straddling 180° therefore has to be searched as two boxes, one on
//! each side of the line. [`split`] turns a tile footprint in any supported
//! CRS into either one box or a left/right pair.
//!
//! The extent is derived from per-component extents so that footprints
//! already cut at 180° (a multipolygon with one part at 179.x and one at
//! -179.x) are recognised as a single narrow region rather than a box
//! spanning the whole globe.

use std::fmt;

use geo::{Coord, Geometry};
use tracing::trace;

use crate::coord::{BoundingBox, MAX_LON, MIN_LON};
use crate::geometry::{fix, GeometryError, TileGeometry};

/// Slack allowed past ±180° before a box counts as crossing.
pub const ANTIMERIDIAN_TOLERANCE: f64 = 1e-5;

/// One box, or the two halves of a region crossing the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchBounds {
    Single(BoundingBox),
    /// West half ending at 180°, east half starting at -180°
    Split(BoundingBox, BoundingBox),
}

impl SearchBounds {
    /// Boxes to query, west half first.
    pub fn boxes(&self) -> Vec<BoundingBox> {
        match self {
            SearchBounds::Single(b) => vec![*b],
            SearchBounds::Split(left, right) => vec![*left, *right],
        }
    }

    #[inline]
    pub fn is_split(&self) -> bool {
        matches!(self, SearchBounds::Split(..))
    }

    /// Returns true if any of the boxes intersects `other`.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.boxes().iter().any(|b| b.intersects(other))
    }
}

impl fmt::Display for SearchBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBounds::Single(b) => write!(f, "{}", b),
            SearchBounds::Split(left, right) => write!(f, "{} + {}", left, right),
        }
    }
}

/// Computes non-wrapping search bounds for a tile footprint.
pub fn split(tile: &TileGeometry) -> Result<SearchBounds, GeometryError> {
    let fixed = TileGeometry::new(fix(tile.geometry())?, tile.crs());
    let geographic = fixed.to_geographic()?;

    let mut components = Vec::new();
    collect_components(geographic.geometry(), &mut components);
    let extents: Vec<Extent> = components
        .iter()
        .filter_map(|coords| Extent::of(coords))
        .collect();
    let (west, south, east, north) = combined_extent(&extents).ok_or(GeometryError::Empty)?;

    trace!(west, south, east, north, "tile extent in degrees");
    split_bounds(west, south, east, north)
}

/// Normalizes a `[west, south, east, north]` extent and splits it at 180°.
///
/// `west > east` is read as a box wrapping through the antimeridian. The
/// extent may also be expressed past ±180° (e.g. `179..181`); it is shifted
/// back so the west edge lies in `[-180, 180)` before deciding.
pub fn split_bounds(
    west: f64,
    south: f64,
    east: f64,
    north: f64,
) -> Result<SearchBounds, GeometryError> {
    let (mut west, mut east) = (west, east);
    if west > east {
        east += 360.0;
    }
    // A west edge within tolerance of 180° only touches it from the east
    let touches_from_east =
        west >= MAX_LON - ANTIMERIDIAN_TOLERANCE && east > MAX_LON + ANTIMERIDIAN_TOLERANCE;
    if west >= MAX_LON || touches_from_east {
        west -= 360.0;
        east -= 360.0;
    } else if west < MIN_LON - ANTIMERIDIAN_TOLERANCE {
        west += 360.0;
        east += 360.0;
    }

    let make = |w: f64, e: f64| {
        BoundingBox::new(w, south, e, north)
            .map_err(|err| GeometryError::InvalidExtent(err.to_string()))
    };

    if east > MAX_LON + ANTIMERIDIAN_TOLERANCE {
        let left = make(west.max(MIN_LON), MAX_LON)?;
        let right = make(MIN_LON, (east - 360.0).min(MAX_LON))?;
        Ok(SearchBounds::Split(left, right))
    } else {
        Ok(SearchBounds::Single(make(
            west.clamp(MIN_LON, MAX_LON),
            east.clamp(MIN_LON, MAX_LON),
        )?))
    }
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    /// Extent of one ring or line, unwrapped when it spans more than half
    /// the globe.
    fn of(coords: &[Coord<f64>]) -> Option<Extent> {
        let mut extent = Self::raw(coords.iter().copied())?;
        if extent.max_x - extent.min_x > 180.0 {
            extent = Self::raw(coords.iter().map(|c| {
                if c.x < 0.0 {
                    Coord { x: c.x + 360.0, y: c.y }
                } else {
                    *c
                }
            }))?;
        }
        Some(extent)
    }

    fn raw(coords: impl Iterator<Item = Coord<f64>>) -> Option<Extent> {
        coords.fold(None, |acc: Option<Extent>, c| {
            Some(match acc {
                None => Extent {
                    min_x: c.x,
                    min_y: c.y,
                    max_x: c.x,
                    max_y: c.y,
                },
                Some(e) => Extent {
                    min_x: e.min_x.min(c.x),
                    min_y: e.min_y.min(c.y),
                    max_x: e.max_x.max(c.x),
                    max_y: e.max_y.max(c.y),
                },
            })
        })
    }

    fn is_antimeridian_sliver(&self) -> bool {
        self.min_x == self.max_x && self.min_x.abs() == MAX_LON
    }

    fn shifted_east(&self) -> Extent {
        if (self.min_x + self.max_x) / 2.0 < 0.0 {
            Extent {
                min_x: self.min_x + 360.0,
                max_x: self.max_x + 360.0,
                ..*self
            }
        } else {
            *self
        }
    }
}

fn union_extents(extents: impl Iterator<Item = Extent>) -> Option<(f64, f64, f64, f64)> {
    extents.fold(None, |acc, e| {
        Some(match acc {
            None => (e.min_x, e.min_y, e.max_x, e.max_y),
            Some((w, s, east, n)) => (
                w.min(e.min_x),
                s.min(e.min_y),
                east.max(e.max_x),
                n.max(e.max_y),
            ),
        })
    })
}

/// Unions component extents, picking whichever of the plain and the
/// east-shifted union is narrower.
fn combined_extent(extents: &[Extent]) -> Option<(f64, f64, f64, f64)> {
    let has_body = extents.iter().any(|e| !e.is_antimeridian_sliver());
    let kept: Vec<Extent> = extents
        .iter()
        .copied()
        .filter(|e| !has_body || !e.is_antimeridian_sliver())
        .collect();

    let naive = union_extents(kept.iter().copied())?;
    let shifted = union_extents(kept.iter().map(Extent::shifted_east))?;
    if shifted.2 - shifted.0 < naive.2 - naive.0 {
        Some(shifted)
    } else {
        Some(naive)
    }
}

fn collect_components(geometry: &Geometry<f64>, out: &mut Vec<Vec<Coord<f64>>>) {
    match geometry {
        Geometry::Point(p) => out.push(vec![p.0]),
        Geometry::MultiPoint(mp) => out.extend(mp.0.iter().map(|p| vec![p.0])),
        Geometry::Line(l) => out.push(vec![l.start, l.end]),
        Geometry::LineString(ls) => out.push(ls.0.clone()),
        Geometry::MultiLineString(mls) => out.extend(mls.0.iter().map(|ls| ls.0.clone())),
        Geometry::Polygon(p) => out.push(p.exterior().0.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().map(|p| p.exterior().0.clone())),
        Geometry::Rect(r) => out.push(r.to_polygon().exterior().0.clone()),
        Geometry::Triangle(t) => out.push(t.to_array().to_vec()),
        Geometry::GeometryCollection(gc) => {
            for g in gc.iter() {
                collect_components(g, out);
            }
        }
    }
}
