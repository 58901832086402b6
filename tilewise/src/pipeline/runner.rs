//! Run driver: iterates tiles, records outcomes, decides when to stop.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

use super::error::RunError;
use super::log::TileLog;
use super::outcome::{RunReport, TaskOutcome};
use super::task::Task;
use super::traits::{Loader, Processor, Writer};
use crate::coord::TileId;
use crate::geometry::TileGeometry;
use crate::search::Searcher;

/// Default number of tiles processed at once by [`Runner::run_concurrent`].
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Run-level settings.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Keep going after a tile fails (unsupported geometry always stops)
    pub continue_on_error: bool,
    /// Redo tiles whose outputs already exist
    pub overwrite: bool,
    /// Upper bound on concurrently running tiles
    pub max_in_flight: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            overwrite: false,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// Drives a [`Task`] over many tiles.
pub struct Runner<S, L, P, W> {
    task: Task<S, L, P, W>,
    config: RunnerConfig,
    log: Option<TileLog>,
}

impl<S, L, P, W> Runner<S, L, P, W>
where
    S: Searcher + 'static,
    L: Loader,
    P: Processor<Input = L::Data>,
    W: Writer<Data = P::Output>,
{
    /// Creates a runner. The config's `overwrite` flag is applied to the task.
    pub fn new(task: Task<S, L, P, W>, config: RunnerConfig) -> Self {
        let task = task.with_overwrite(config.overwrite);
        Self {
            task,
            config,
            log: None,
        }
    }

    /// Also writes each outcome to a CSV tile log.
    pub fn with_log(mut self, log: TileLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs tiles one after another, in iteration order.
    #[instrument(skip_all)]
    pub async fn run<I>(&mut self, tiles: I) -> Result<RunReport, RunError>
    where
        I: IntoIterator<Item = (TileId, TileGeometry)>,
    {
        let mut report = RunReport::new();
        for (tile_id, area) in tiles {
            let outcome = self.task.run(&tile_id, &area).await;
            self.handle(&mut report, tile_id, outcome)?;
        }
        info!(summary = %report, "Run finished");
        Ok(report)
    }

    /// Runs tiles on spawned tokio tasks, at most `max_in_flight` at a time.
    ///
    /// Outcomes are recorded in completion order. On a halting failure the
    /// remaining in-flight tiles are aborted.
    #[instrument(skip_all, fields(max_in_flight = self.config.max_in_flight))]
    pub async fn run_concurrent<I>(&mut self, tiles: I) -> Result<RunReport, RunError>
    where
        I: IntoIterator<Item = (TileId, TileGeometry)>,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let mut set = JoinSet::new();
        let mut report = RunReport::new();

        for (tile_id, area) in tiles {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return Err(RunError::Join(e.to_string())),
            };
            while let Some(joined) = set.try_join_next() {
                if let Err(e) = self.handle_joined(&mut report, joined) {
                    set.abort_all();
                    return Err(e);
                }
            }

            let task = self.task.clone();
            set.spawn(async move {
                let outcome = task.run(&tile_id, &area).await;
                drop(permit);
                (tile_id, outcome)
            });
        }

        while let Some(joined) = set.join_next().await {
            if let Err(e) = self.handle_joined(&mut report, joined) {
                set.abort_all();
                return Err(e);
            }
        }

        info!(summary = %report, "Run finished");
        Ok(report)
    }

    fn handle_joined(
        &mut self,
        report: &mut RunReport,
        joined: Result<(TileId, TaskOutcome), tokio::task::JoinError>,
    ) -> Result<(), RunError> {
        match joined {
            Ok((tile_id, outcome)) => self.handle(report, tile_id, outcome),
            Err(e) => {
                error!(error = %e, "Tile task did not complete");
                Err(RunError::Join(e.to_string()))
            }
        }
    }

    /// Records an outcome and returns an error if the run must stop.
    ///
    /// A failed log write is reported but never stops the run.
    fn handle(
        &mut self,
        report: &mut RunReport,
        tile_id: TileId,
        outcome: TaskOutcome,
    ) -> Result<(), RunError> {
        if let Some(log) = self.log.as_mut() {
            if let Err(e) = log.record(&tile_id, &outcome) {
                error!(tile = %tile_id, error = %e, "Failed to record tile outcome");
            }
        }

        let halt = outcome
            .error()
            .filter(|err| err.is_fatal() || !self.config.continue_on_error)
            .cloned();
        report.record(tile_id.clone(), outcome);

        match halt {
            Some(source) => {
                error!(tile = %tile_id, error = %source, "Halting run");
                Err(RunError::Halted {
                    tile_id,
                    source,
                    report: Box::new(report.clone()),
                })
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::task::tests::{
        square, CountProcessor, FixedSearcher, IdLoader, MemoryWriter,
    };
    use crate::pipeline::TaskError;
    use geo::Point;
    use tempfile::TempDir;

    type TestRunner = Runner<FixedSearcher, IdLoader, CountProcessor, MemoryWriter>;

    fn runner(ids: Vec<&'static str>, writer: MemoryWriter, config: RunnerConfig) -> TestRunner {
        let task = Task::new(
            Arc::new(FixedSearcher::items(ids)),
            Arc::new(IdLoader),
            Arc::new(CountProcessor),
            Arc::new(writer),
        );
        Runner::new(task, config)
    }

    fn tiles(n: i32) -> Vec<(TileId, TileGeometry)> {
        (0..n).map(|col| (TileId::grid(col, 0), square())).collect()
    }

    #[tokio::test]
    async fn test_run_records_every_tile() {
        let mut runner = runner(vec!["a"], MemoryWriter::default(), RunnerConfig::default());
        let report = runner.run(tiles(3)).await.unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.complete(), 3);
        let order: Vec<_> = report.records().iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(
            order,
            vec![TileId::grid(0, 0), TileId::grid(1, 0), TileId::grid(2, 0)]
        );
    }

    #[tokio::test]
    async fn test_failures_continue_by_default() {
        let writer = MemoryWriter {
            fail: true,
            ..Default::default()
        };
        let mut runner = runner(vec!["a"], writer, RunnerConfig::default());
        let report = runner.run(tiles(3)).await.unwrap();
        assert_eq!(report.failed(), 3);
    }

    #[tokio::test]
    async fn test_fail_fast_halts_on_first_failure() {
        let writer = MemoryWriter {
            fail: true,
            ..Default::default()
        };
        let config = RunnerConfig {
            continue_on_error: false,
            ..Default::default()
        };
        let mut runner = runner(vec!["a"], writer, config);

        match runner.run(tiles(3)).await {
            Err(RunError::Halted {
                tile_id, report, ..
            }) => {
                assert_eq!(tile_id, TileId::grid(0, 0));
                assert_eq!(report.total(), 1);
            }
            other => panic!("expected halt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_skips_never_halt() {
        let config = RunnerConfig {
            continue_on_error: false,
            ..Default::default()
        };
        let mut runner = runner(vec![], MemoryWriter::default(), config);
        let report = runner.run(tiles(2)).await.unwrap();
        assert_eq!(report.skipped(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_geometry_always_halts() {
        let mut runner = runner(vec!["a"], MemoryWriter::default(), RunnerConfig::default());
        let input = vec![
            (TileId::grid(0, 0), square()),
            (
                TileId::grid(1, 0),
                TileGeometry::geographic(Point::new(0.0, 0.0)),
            ),
            (TileId::grid(2, 0), square()),
        ];

        match runner.run(input).await {
            Err(RunError::Halted { tile_id, source, report }) => {
                assert_eq!(tile_id, TileId::grid(1, 0));
                assert!(matches!(source, TaskError::UnsupportedGeometry(_)));
                assert_eq!(report.complete(), 1);
            }
            other => panic!("expected halt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_writes_tile_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        let mut runner = runner(vec![], MemoryWriter::default(), RunnerConfig::default())
            .with_log(TileLog::open(&path).unwrap());

        runner.run(tiles(2)).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"0,0\",skipped:no-items,no items for area"));
        assert!(contents.contains("\"1,0\",skipped:no-items"));
    }

    /// Sink that rejects every write.
    struct FullDisk;

    impl std::io::Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_log_write_failure_does_not_stop_run() {
        let mut runner = runner(vec!["a"], MemoryWriter::default(), RunnerConfig::default())
            .with_log(TileLog::from_writer("full.csv", FullDisk));

        let report = runner.run(tiles(3)).await.unwrap();
        assert_eq!(report.total(), 3);
        assert_eq!(report.complete(), 3);

        let report = runner.run_concurrent(tiles(2)).await.unwrap();
        assert_eq!(report.complete(), 2);
    }

    #[tokio::test]
    async fn test_run_concurrent_completes_all_tiles() {
        let config = RunnerConfig {
            max_in_flight: 2,
            ..Default::default()
        };
        let mut runner = runner(vec!["a", "b"], MemoryWriter::default(), config);
        let report = runner.run_concurrent(tiles(10)).await.unwrap();

        assert_eq!(report.total(), 10);
        assert_eq!(report.complete(), 10);
        for col in 0..10 {
            assert!(report.outcome(&TileId::grid(col, 0)).is_some());
        }
    }

    #[tokio::test]
    async fn test_run_concurrent_halts_on_unsupported_geometry() {
        let mut runner = runner(vec!["a"], MemoryWriter::default(), RunnerConfig::default());
        let input = vec![(
            TileId::grid(5, 5),
            TileGeometry::geographic(Point::new(0.0, 0.0)),
        )];
        let result = runner.run_concurrent(input).await;
        assert!(matches!(result, Err(RunError::Halted { .. })));
    }
}
