//! Tile identifiers and geographic bounding boxes.
//!
//! Provides the addressing used across the crate: [`TileId`] keys a unit of
//! work, and [`BoundingBox`] is the non-wrapping geographic box sent to
//! catalog searches.

mod types;

pub use types::{BoundingBox, CoordError, TileId, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Wraps a longitude into `[-180, 180)`.
#[inline]
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can land exactly on 180 through rounding
    if wrapped >= MAX_LON {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Zero-pads a numeric id part to three characters, as pathrow and grid
/// identifiers are conventionally written.
#[inline]
pub fn zero_pad3(value: impl std::fmt::Display) -> String {
    format!("{:0>3}", value.to_string())
}

#[cfg(test)]
mod tests;
