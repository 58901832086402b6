//! Coordinate type definitions

use std::fmt;

/// Valid latitude range in geographic degrees
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range for a non-wrapping search box
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Identifier of one unit of work.
///
/// Tile ids are stable across runs: the same grid and resolution always
/// produce the same ids, which is what lets a resumed run recognise tiles it
/// has already written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileId {
    /// Cell of a regular projected grid, addressed as (column, row)
    Grid { col: i32, row: i32 },
    /// Fixed ground-track cell of a pushbroom sensor
    PathRow { path: u16, row: u16 },
    /// Compound key, e.g. a country code plus a sequence number
    Named { code: String, seq: u32 },
}

impl TileId {
    /// Creates a grid tile id.
    #[inline]
    pub fn grid(col: i32, row: i32) -> Self {
        TileId::Grid { col, row }
    }

    /// Creates a pathrow tile id.
    #[inline]
    pub fn pathrow(path: u16, row: u16) -> Self {
        TileId::PathRow { path, row }
    }

    /// Returns the id as its ordered parts, for path building.
    ///
    /// Numeric parts are rendered without padding; the naming scheme decides
    /// whether to pad them.
    pub fn parts(&self) -> Vec<String> {
        match self {
            TileId::Grid { col, row } => vec![col.to_string(), row.to_string()],
            TileId::PathRow { path, row } => vec![path.to_string(), row.to_string()],
            TileId::Named { code, seq } => vec![code.clone(), seq.to_string()],
        }
    }

    /// Returns the (path, row) pair when this id addresses a pathrow cell.
    pub fn as_pathrow(&self) -> Option<(u16, u16)> {
        match self {
            TileId::PathRow { path, row } => Some((*path, *row)),
            _ => None,
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileId::Grid { col, row } => write!(f, "{},{}", col, row),
            TileId::PathRow { path, row } => write!(f, "{:03}/{:03}", path, row),
            TileId::Named { code, seq } => write!(f, "{}-{}", code, seq),
        }
    }
}

impl std::str::FromStr for TileId {
    type Err = CoordError;

    /// Parses `col,row`, `path/row` or `CODE-seq`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || CoordError::InvalidTileId(s.to_string());

        if let Some((col, row)) = s.split_once(',') {
            let col = col.trim().parse().map_err(|_| invalid())?;
            let row = row.trim().parse().map_err(|_| invalid())?;
            return Ok(TileId::Grid { col, row });
        }
        if let Some((path, row)) = s.split_once('/') {
            let path = path.trim().parse().map_err(|_| invalid())?;
            let row = row.trim().parse().map_err(|_| invalid())?;
            return Ok(TileId::PathRow { path, row });
        }
        if let Some((code, seq)) = s.rsplit_once('-') {
            if code.is_empty() {
                return Err(invalid());
            }
            let seq = seq.trim().parse().map_err(|_| invalid())?;
            return Ok(TileId::Named {
                code: code.to_string(),
                seq,
            });
        }
        Err(invalid())
    }
}

/// Geographic bounding box in degrees.
///
/// A box never wraps: `min_x <= max_x` is checked on construction. Regions
/// crossing the antimeridian are represented as two boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundingBox {
    /// Creates a box, rejecting wrapping or inverted edges.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, CoordError> {
        if !(min_x <= max_x) {
            return Err(CoordError::WrappingBox { min_x, max_x });
        }
        if !(min_y <= max_y) {
            return Err(CoordError::InvertedBox { min_y, max_y });
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Creates a box from edges known to be ordered.
    pub(crate) const fn from_ordered(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Returns `[min_x, min_y, max_x, max_y]`, the order catalog APIs expect.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Width in degrees.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns true if the two boxes overlap or touch.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Converts to a `geo::Rect` for spatial predicates.
    pub fn to_rect(&self) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::coord! { x: self.min_x, y: self.min_y },
            geo::coord! { x: self.max_x, y: self.max_y },
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Errors that can occur when building coordinates and ids.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Western edge is east of the eastern edge
    WrappingBox { min_x: f64, max_x: f64 },
    /// Southern edge is north of the northern edge
    InvertedBox { min_y: f64, max_y: f64 },
    /// Tile id string could not be parsed
    InvalidTileId(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::WrappingBox { min_x, max_x } => {
                write!(
                    f,
                    "Bounding box wraps: min_x {} is greater than max_x {}",
                    min_x, max_x
                )
            }
            CoordError::InvertedBox { min_y, max_y } => {
                write!(
                    f,
                    "Bounding box is inverted: min_y {} is greater than max_y {}",
                    min_y, max_y
                )
            }
            CoordError::InvalidTileId(id) => {
                write!(
                    f,
                    "Invalid tile id: '{}' (expected 'col,row', 'path/row' or 'CODE-seq')",
                    id
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
