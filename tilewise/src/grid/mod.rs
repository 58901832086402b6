//! Regular tile grids.
//!
//! A logical grid is a [`GridDefinition`]: a projected CRS, an origin, a
//! fixed tile side length in CRS units and an outer geographic bound. Fixing
//! a pixel resolution gives a [`GridSpec`], from which [`TileGrid`] sweeps
//! out [`Tile`]s. Because the side length is fixed, tile ids are the same at
//! every resolution the definition accepts.

mod area;
mod definition;
mod tiles;

pub use area::AreaOfInterest;
pub use definition::{GridDefinition, GridSpec};
pub use tiles::{Tile, TileGrid};

use std::path::PathBuf;
use thiserror::Error;

use crate::coord::TileId;
use crate::geometry::GeometryError;

/// Errors that can occur when building grids and tiles.
#[derive(Debug, Error)]
pub enum GridError {
    /// Tile side is not a whole number of pixels at this resolution
    #[error("resolution {resolution} does not divide the tile side {tile_side} evenly")]
    ResolutionMismatch { resolution: f64, tile_side: f64 },

    #[error("invalid resolution: {0}")]
    InvalidResolution(f64),

    /// Only grid ids address cells of a regular grid
    #[error("tile id {0} does not address a cell of this grid")]
    UnsupportedTileId(TileId),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("failed to read area of interest from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No polygons survived reading or filtering
    #[error("area of interest is empty")]
    EmptyArea,
}
