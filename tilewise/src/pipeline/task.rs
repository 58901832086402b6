//! Single-tile pipeline execution.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::error::TaskError;
use super::outcome::TaskOutcome;
use super::traits::{Loader, Processor, Writer};
use crate::coord::TileId;
use crate::geometry::TileGeometry;
use crate::search::Searcher;

/// Runs Search → Load → Process → Write for one tile.
///
/// Collaborators are held behind `Arc` so a task is cheap to clone into
/// spawned futures. Stages run strictly in sequence; the first failure ends
/// the tile.
pub struct Task<S, L, P, W> {
    searcher: Arc<S>,
    loader: Arc<L>,
    processor: Arc<P>,
    writer: Arc<W>,
    overwrite: bool,
}

impl<S, L, P, W> Clone for Task<S, L, P, W> {
    fn clone(&self) -> Self {
        Self {
            searcher: Arc::clone(&self.searcher),
            loader: Arc::clone(&self.loader),
            processor: Arc::clone(&self.processor),
            writer: Arc::clone(&self.writer),
            overwrite: self.overwrite,
        }
    }
}

impl<S, L, P, W> Task<S, L, P, W>
where
    S: Searcher,
    L: Loader,
    P: Processor<Input = L::Data>,
    W: Writer<Data = P::Output>,
{
    pub fn new(searcher: Arc<S>, loader: Arc<L>, processor: Arc<P>, writer: Arc<W>) -> Self {
        Self {
            searcher,
            loader,
            processor,
            writer,
            overwrite: false,
        }
    }

    /// When false (the default), tiles whose outputs exist are not redone.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[inline]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Runs the pipeline for one tile and classifies the result.
    #[instrument(skip_all, fields(tile = %tile_id))]
    pub async fn run(&self, tile_id: &TileId, area: &TileGeometry) -> TaskOutcome {
        let outcome = TaskOutcome::from(self.execute(tile_id, area).await);
        match &outcome {
            TaskOutcome::Complete(paths) => debug!(paths = ?paths, "Tile complete"),
            TaskOutcome::Skipped(reason) => debug!(reason = %reason, "Tile skipped"),
            TaskOutcome::Failed(err) => warn!(kind = %err.kind(), error = %err, "Tile failed"),
        }
        outcome
    }

    async fn execute(&self, tile_id: &TileId, area: &TileGeometry) -> Result<Vec<String>, TaskError> {
        if !self.overwrite {
            let written = self
                .writer
                .already_written(tile_id)
                .map_err(TaskError::Write)?;
            if written {
                debug!("Outputs already exist");
                return Ok(self.writer.output_paths(tile_id));
            }
        }

        let items = self
            .searcher
            .search(tile_id, area)
            .await
            .map_err(TaskError::from_search)?;
        debug!(items = items.len(), "Search complete");

        let data = self
            .loader
            .load(&items, area)
            .await
            .map_err(TaskError::Load)?;

        let output = self
            .processor
            .process(data)
            .map_err(TaskError::Process)?
            .ok_or(TaskError::NoOutput)?;

        self.writer.write(output, tile_id).map_err(TaskError::Write)
    }
}
