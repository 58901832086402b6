//! Per-tile outcome log.
//!
//! One CSV record per tile: `tile_id,outcome,detail`. The file is appended
//! to, so a resumed run adds to the log of the run it resumes.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::error::RunError;
use super::outcome::TaskOutcome;
use crate::coord::TileId;

const HEADER: [&str; 3] = ["tile_id", "outcome", "detail"];

/// CSV writer for tile outcomes.
pub struct TileLog {
    path: PathBuf,
    writer: csv::Writer<Box<dyn io::Write + Send>>,
}

impl TileLog {
    /// Opens the log at `path` for appending, creating parent directories.
    ///
    /// A header row is written only when the file is new or empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RunError> {
        let path = path.as_ref().to_path_buf();
        let log_err = |e: &dyn std::fmt::Display| RunError::Log {
            path: path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| log_err(&e))?;
        }
        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| log_err(&e))?;

        let mut writer = Self::csv_writer(Box::new(file));
        if needs_header {
            writer.write_record(HEADER).map_err(|e| log_err(&e))?;
            writer.flush().map_err(|e| log_err(&e))?;
        }

        Ok(Self { path, writer })
    }

    /// Log over an arbitrary sink, without a header row.
    #[cfg(test)]
    pub(crate) fn from_writer(
        path: impl Into<PathBuf>,
        sink: impl io::Write + Send + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            writer: Self::csv_writer(Box::new(sink)),
        }
    }

    fn csv_writer(sink: Box<dyn io::Write + Send>) -> csv::Writer<Box<dyn io::Write + Send>> {
        csv::WriterBuilder::new().has_headers(false).from_writer(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one tile's record and flushes it.
    pub fn record(&mut self, tile_id: &TileId, outcome: &TaskOutcome) -> Result<(), RunError> {
        let record = [
            tile_id.to_string(),
            outcome.kind().to_string(),
            outcome.detail(),
        ];
        self.writer
            .write_record(&record)
            .map_err(|e| self.error(&e))?;
        self.writer.flush().map_err(|e| self.error(&e))
    }

    fn error(&self, err: &dyn std::fmt::Display) -> RunError {
        RunError::Log {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TaskError;
    use tempfile::TempDir;

    #[test]
    fn test_records_are_quoted_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("run_log.csv");

        let mut log = TileLog::open(&path).unwrap();
        log.record(&TileId::grid(66, 22), &TaskOutcome::Complete(vec!["a.json".into()]))
            .unwrap();
        log.record(
            &TileId::pathrow(73, 72),
            &TaskOutcome::Failed(TaskError::NoOutput),
        )
        .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "tile_id,outcome,detail");
        assert_eq!(lines[1], "\"66,22\",complete,a.json");
        assert_eq!(lines[2], "073/072,error:process,no output from processor");
    }

    #[test]
    fn test_reopen_appends_without_second_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");

        {
            let mut log = TileLog::open(&path).unwrap();
            log.record(&TileId::grid(0, 0), &TaskOutcome::Skipped("none".into()))
                .unwrap();
        }
        {
            let mut log = TileLog::open(&path).unwrap();
            log.record(&TileId::grid(1, 0), &TaskOutcome::Skipped("none".into()))
                .unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("tile_id,outcome,detail").count(), 1);
        assert_eq!(contents.lines().count(), 3);
    }
}
