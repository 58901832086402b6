//! Stage contracts.
//!
//! A task composes one implementation of each trait. Implementations are
//! shared across every tile of a run (behind `Arc`), so they must be
//! `Send + Sync` and hold no per-tile state.

use std::future::Future;

use super::error::StageError;
use crate::catalog::ItemCollection;
use crate::coord::TileId;
use crate::geometry::TileGeometry;

/// Turns a tile's catalog items into data for the processor.
pub trait Loader: Send + Sync + 'static {
    type Data: Send + 'static;

    /// Loads the data for `items`, restricted to `area`.
    fn load(
        &self,
        items: &ItemCollection,
        area: &TileGeometry,
    ) -> impl Future<Output = Result<Self::Data, StageError>> + Send;
}

/// Transforms loaded data into output data.
pub trait Processor: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Returns `Ok(None)` when the input yields no usable data.
    fn process(&self, input: Self::Input) -> Result<Option<Self::Output>, StageError>;
}

/// Persists a tile's output.
pub trait Writer: Send + Sync + 'static {
    type Data: Send + 'static;

    /// Writes `data` and returns the paths written.
    fn write(&self, data: Self::Data, tile_id: &TileId) -> Result<Vec<String>, StageError>;

    /// Returns true if the tile's outputs already exist.
    fn already_written(&self, tile_id: &TileId) -> Result<bool, StageError>;

    /// Paths this writer produces for a tile.
    fn output_paths(&self, tile_id: &TileId) -> Vec<String>;
}
