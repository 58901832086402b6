//! Error types for the per-tile pipeline.
//!
//! Errors are categorized by stage so the runner can record what kind of
//! failure happened to each tile and decide whether to keep going.

use std::path::PathBuf;

use thiserror::Error;

use super::outcome::{OutcomeKind, RunReport};
use crate::coord::TileId;
use crate::geometry::GeometryError;
use crate::search::SearchError;

/// Errors raised by a loader, processor or writer.
#[derive(Debug, Error, Clone)]
pub enum StageError {
    /// Catalog search failed for a reason other than "no items"
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Tile footprint could not be used
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Item is missing an asset the stage needs
    #[error("item {item_id} has no asset '{band}'")]
    MissingAsset { item_id: String, band: String },

    /// File I/O error
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// Output could not be serialized
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Collaborator-specific failure
    #[error("{0}")]
    Other(String),
}

impl StageError {
    /// Creates a free-form stage error.
    pub fn other(message: impl std::fmt::Display) -> Self {
        StageError::Other(message.to_string())
    }

    pub(crate) fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        StageError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Errors that end a single tile's task.
#[derive(Debug, Error, Clone)]
pub enum TaskError {
    /// Search found nothing to process
    #[error("no items for area")]
    NoItems,

    /// Search or load stage failed
    #[error("load failed: {0}")]
    Load(#[source] StageError),

    /// Processor failed
    #[error("processing failed: {0}")]
    Process(#[source] StageError),

    /// Processor ran but returned no data
    #[error("no output from processor")]
    NoOutput,

    /// Writer failed
    #[error("write failed: {0}")]
    Write(#[source] StageError),

    /// Tile footprint is a geometry the pipeline cannot handle
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
}

impl TaskError {
    /// Classifies a search failure.
    pub fn from_search(err: SearchError) -> Self {
        match err {
            SearchError::EmptyCollection => TaskError::NoItems,
            SearchError::Geometry(GeometryError::Unsupported(kind)) => {
                TaskError::UnsupportedGeometry(kind.to_string())
            }
            other => TaskError::Load(StageError::Search(other)),
        }
    }

    /// Returns true if the run must stop regardless of configuration.
    ///
    /// An unsupported footprint means the grid itself is wrong, so every
    /// remaining tile would fail the same way.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, TaskError::UnsupportedGeometry(_))
    }

    /// Returns the log category for this error.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            TaskError::NoItems => OutcomeKind::SkippedNoItems,
            TaskError::Load(_) | TaskError::UnsupportedGeometry(_) => OutcomeKind::LoadError,
            TaskError::Process(_) | TaskError::NoOutput => OutcomeKind::ProcessError,
            TaskError::Write(_) => OutcomeKind::WriteError,
        }
    }
}

/// Errors that stop a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A tile failed and the run is not allowed to continue
    #[error("run halted at tile {tile_id}: {source}")]
    Halted {
        tile_id: TileId,
        #[source]
        source: TaskError,
        /// Outcomes recorded up to and including the halting tile
        report: Box<RunReport>,
    },

    /// Per-tile log could not be written
    #[error("failed to write tile log {path}: {message}")]
    Log { path: PathBuf, message: String },

    /// A spawned task panicked or was cancelled
    #[error("tile task aborted: {0}")]
    Join(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;

    #[test]
    fn test_empty_collection_is_no_items() {
        let err = TaskError::from_search(SearchError::EmptyCollection);
        assert!(matches!(err, TaskError::NoItems));
        assert_eq!(err.kind(), OutcomeKind::SkippedNoItems);
    }

    #[test]
    fn test_unsupported_geometry_is_fatal() {
        let err = TaskError::from_search(SearchError::Geometry(GeometryError::Unsupported(
            "Point",
        )));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "unsupported geometry: Point");
    }

    #[test]
    fn test_catalog_failure_is_load_error() {
        let err = TaskError::from_search(SearchError::Catalog {
            attempts: 3,
            source: CatalogError::Http("timeout".to_string()),
        });
        assert!(matches!(err, TaskError::Load(StageError::Search(_))));
        assert!(!err.is_fatal());
        assert_eq!(err.kind(), OutcomeKind::LoadError);
    }

    #[test]
    fn test_no_output_is_process_kind() {
        assert_eq!(TaskError::NoOutput.kind(), OutcomeKind::ProcessError);
        assert_eq!(
            TaskError::Write(StageError::other("disk full")).kind(),
            OutcomeKind::WriteError
        );
    }
}
