//! Antimeridian-safe catalog searching.
//!
//! A [`Searcher`] turns a tile footprint into the catalog items covering it.
//! [`StacSearcher`] is the general implementation: it splits the footprint
//! at 180°, queries each half with retries, merges and deduplicates the
//! results, repairs known metadata defects and drops known-bad items.
//! [`PathrowSearcher`] layers Landsat pathrow filtering and tier fallback on
//! top of it.

mod pathrow;
mod retry;
mod sanitize;
mod stac;

pub use pathrow::{PathrowIndex, PathrowSearcher, LANDSAT_PLATFORMS};
pub use retry::{RetryPolicy, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS};
pub use sanitize::{fix_bad_epsgs, remove_bad_items, DENIED_ITEM_IDS, MALFORMED_EPSG_COLLECTIONS};
pub use stac::StacSearcher;

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::{CatalogError, ItemCollection};
use crate::coord::TileId;
use crate::geometry::{GeometryError, TileGeometry};

/// Errors that can occur while searching for a tile's items.
#[derive(Debug, Error, Clone)]
pub enum SearchError {
    /// Search succeeded but nothing matched
    #[error("no items found")]
    EmptyCollection,

    /// Catalog kept failing after every retry
    #[error("catalog query failed after {attempts} attempts: {source}")]
    Catalog {
        attempts: u32,
        #[source]
        source: CatalogError,
    },

    /// Tile footprint could not be turned into search bounds
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("pathrow index {path}: {reason}")]
    Index { path: PathBuf, reason: String },
}

impl SearchError {
    /// Returns true for the "nothing to process" outcome.
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, SearchError::EmptyCollection)
    }
}

/// Trait for components that find the catalog items for a tile.
pub trait Searcher: Send + Sync {
    /// Returns the items covering `area`.
    ///
    /// Returns [`SearchError::EmptyCollection`] when nothing matches, unless
    /// the implementation is configured to return an empty collection.
    fn search(
        &self,
        tile_id: &TileId,
        area: &TileGeometry,
    ) -> impl Future<Output = Result<ItemCollection, SearchError>> + Send;
}
