//! Per-tile outcomes and run summaries.

use std::collections::BTreeMap;
use std::fmt;

use super::error::TaskError;
use crate::coord::TileId;

/// Result of running the pipeline for one tile.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// Outputs exist at these paths
    Complete(Vec<String>),
    /// Nothing to do for this tile
    Skipped(String),
    /// The tile failed at some stage
    Failed(TaskError),
}

impl TaskOutcome {
    /// Returns the log category of this outcome.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            TaskOutcome::Complete(_) => OutcomeKind::Complete,
            TaskOutcome::Skipped(_) => OutcomeKind::SkippedNoItems,
            TaskOutcome::Failed(err) => err.kind(),
        }
    }

    /// Returns the free-text detail recorded alongside the kind.
    pub fn detail(&self) -> String {
        match self {
            TaskOutcome::Complete(paths) => paths.join(" "),
            TaskOutcome::Skipped(reason) => reason.clone(),
            TaskOutcome::Failed(err) => err.to_string(),
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskOutcome::Complete(_))
    }

    #[inline]
    pub fn is_skipped(&self) -> bool {
        matches!(self, TaskOutcome::Skipped(_))
    }

    /// Returns the error if the tile failed.
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            TaskOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Result<Vec<String>, TaskError>> for TaskOutcome {
    /// "No items" is a skip, not a failure.
    fn from(result: Result<Vec<String>, TaskError>) -> Self {
        match result {
            Ok(paths) => TaskOutcome::Complete(paths),
            Err(TaskError::NoItems) => TaskOutcome::Skipped(TaskError::NoItems.to_string()),
            Err(err) => TaskOutcome::Failed(err),
        }
    }
}

/// Category written to the per-tile log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutcomeKind {
    Complete,
    SkippedNoItems,
    LoadError,
    ProcessError,
    WriteError,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Complete => "complete",
            OutcomeKind::SkippedNoItems => "skipped:no-items",
            OutcomeKind::LoadError => "error:load",
            OutcomeKind::ProcessError => "error:process",
            OutcomeKind::WriteError => "error:write",
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            OutcomeKind::LoadError | OutcomeKind::ProcessError | OutcomeKind::WriteError
        )
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcomes of a run, in the order they were recorded.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    records: Vec<(TileId, TaskOutcome)>,
    counts: BTreeMap<OutcomeKind, usize>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one tile's outcome.
    pub fn record(&mut self, tile_id: TileId, outcome: TaskOutcome) {
        *self.counts.entry(outcome.kind()).or_insert(0) += 1;
        self.records.push((tile_id, outcome));
    }

    /// Number of tiles with the given outcome kind.
    #[inline]
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    #[inline]
    pub fn complete(&self) -> usize {
        self.count(OutcomeKind::Complete)
    }

    #[inline]
    pub fn skipped(&self) -> usize {
        self.count(OutcomeKind::SkippedNoItems)
    }

    /// Number of tiles that failed at any stage.
    pub fn failed(&self) -> usize {
        self.counts
            .iter()
            .filter(|(kind, _)| kind.is_error())
            .map(|(_, n)| n)
            .sum()
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Returns the outcome recorded for a tile.
    pub fn outcome(&self, tile_id: &TileId) -> Option<&TaskOutcome> {
        self.records
            .iter()
            .find(|(id, _)| id == tile_id)
            .map(|(_, outcome)| outcome)
    }

    pub fn records(&self) -> &[(TileId, TaskOutcome)] {
        &self.records
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles: {} complete, {} skipped, {} load errors, {} process errors, {} write errors",
            self.total(),
            self.complete(),
            self.skipped(),
            self.count(OutcomeKind::LoadError),
            self.count(OutcomeKind::ProcessError),
            self.count(OutcomeKind::WriteError)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageError;

    #[test]
    fn test_no_items_becomes_skip() {
        let outcome = TaskOutcome::from(Err(TaskError::NoItems));
        assert!(outcome.is_skipped());
        assert_eq!(outcome.kind().as_str(), "skipped:no-items");
        assert_eq!(outcome.detail(), "no items for area");
    }

    #[test]
    fn test_other_errors_are_failures() {
        let outcome = TaskOutcome::from(Err(TaskError::Load(StageError::other("boom"))));
        assert_eq!(outcome.kind().as_str(), "error:load");
        assert!(outcome.error().is_some());
    }

    #[test]
    fn test_complete_detail_lists_paths() {
        let outcome = TaskOutcome::from(Ok(vec!["a.tif".to_string(), "b.json".to_string()]));
        assert!(outcome.is_complete());
        assert_eq!(outcome.detail(), "a.tif b.json");
    }

    #[test]
    fn test_report_counts() {
        let mut report = RunReport::new();
        report.record(TileId::grid(0, 0), TaskOutcome::Complete(vec![]));
        report.record(TileId::grid(1, 0), TaskOutcome::Skipped("none".to_string()));
        report.record(TileId::grid(2, 0), TaskOutcome::Failed(TaskError::NoOutput));
        report.record(
            TileId::grid(3, 0),
            TaskOutcome::Failed(TaskError::Write(StageError::other("x"))),
        );

        assert_eq!(report.total(), 4);
        assert_eq!(report.complete(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.count(OutcomeKind::ProcessError), 1);
        assert!(report.outcome(&TileId::grid(1, 0)).unwrap().is_skipped());
        assert!(report.outcome(&TileId::grid(9, 9)).is_none());
    }
}
