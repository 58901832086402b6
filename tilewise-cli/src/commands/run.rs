//! Run command - process every selected tile for each time period.

use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use tracing::{info, warn};

use tilewise::catalog::StacApiClient;
use tilewise::coord::TileId;
use tilewise::geometry::TileGeometry;
use tilewise::parsers::datetime_parser;
use tilewise::pipeline::{
    AssetLoader, RunReport, Runner, StacItemWriter, Task, TemporalSummaryProcessor, TileLog,
};
use tilewise::search::{PathrowIndex, Searcher};

use super::common::TileSelection;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: TileSelection,

    /// Year or `start_end` year range; overrides `datetime` in [search]
    #[arg(long)]
    pub datetime: Option<String>,

    /// Redo tiles whose outputs already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Stop at the first failed tile
    #[arg(long)]
    pub fail_fast: bool,

    /// Process tiles concurrently, at most `max_in_flight` at once
    #[arg(long)]
    pub concurrent: bool,
}

/// Run the run command.
pub async fn run(mut runner: CliRunner, args: RunArgs) -> Result<(), CliError> {
    runner.log_startup("run");

    {
        let config = runner.config_mut();
        if let Some(datetime) = &args.datetime {
            config.search.datetime = datetime.clone();
        }
        config.run.overwrite |= args.overwrite;
        if args.fail_fast {
            config.run.continue_on_error = false;
        }
    }

    let periods = datetime_parser(&runner.config().search.datetime)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    let tiles = args.selection.build(&runner.config().grid)?;
    if tiles.is_empty() {
        println!("No tiles selected.");
        return Ok(());
    }
    let tiles: Vec<(TileId, TileGeometry)> = tiles.into_iter().map(|t| t.into_parts()).collect();

    let client = runner.create_client()?;
    let index = runner.load_pathrow_index()?;

    println!(
        "Processing {} tiles over {} period(s)",
        tiles.len(),
        periods.len()
    );

    for period in &periods {
        let started = Instant::now();
        let report = run_period(&runner, &client, index.clone(), period, &tiles, args.concurrent)
            .await?;
        info!(
            period = %period,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Period finished: {}",
            report
        );
        print_report(period, &report);
    }

    Ok(())
}

/// Run all tiles for one time period.
async fn run_period(
    runner: &CliRunner,
    client: &Arc<StacApiClient>,
    index: Option<Arc<PathrowIndex>>,
    period: &str,
    tiles: &[(TileId, TileGeometry)],
    concurrent: bool,
) -> Result<RunReport, CliError> {
    let searcher = runner.stac_searcher(Arc::clone(client), period);
    if runner.wants_pathrow_search() {
        let searcher = runner.pathrow_searcher(searcher, index);
        run_with(runner, searcher, period, tiles, concurrent).await
    } else {
        run_with(runner, searcher, period, tiles, concurrent).await
    }
}

async fn run_with<S>(
    runner: &CliRunner,
    searcher: S,
    period: &str,
    tiles: &[(TileId, TileGeometry)],
    concurrent: bool,
) -> Result<RunReport, CliError>
where
    S: Searcher + 'static,
{
    let config = runner.config();
    let bands = config.output.bands.clone();
    let item_path = config.output.item_path(period);
    let log_path = item_path.log_path();

    let task = Task::new(
        Arc::new(searcher),
        Arc::new(AssetLoader::new(bands.clone())),
        Arc::new(TemporalSummaryProcessor::new(bands)),
        Arc::new(StacItemWriter::new(item_path)),
    );
    let log = TileLog::open(&log_path)?;
    info!(period, log = %log_path, "Starting period");

    let mut tile_runner = Runner::new(task, config.run.runner_config()).with_log(log);
    let tiles = tiles.iter().cloned();
    let report = if concurrent {
        tile_runner.run_concurrent(tiles).await?
    } else {
        tile_runner.run(tiles).await?
    };

    if report.failed() > 0 {
        warn!(period, failed = report.failed(), "Some tiles failed");
    }
    Ok(report)
}

fn print_report(period: &str, report: &RunReport) {
    println!();
    println!("Period {}:", period);
    println!("  Complete: {}", report.complete());
    println!("  Skipped:  {}", report.skipped());
    println!("  Failed:   {}", report.failed());
    for (tile_id, outcome) in report.records() {
        if let Some(err) = outcome.error() {
            println!("    {} {}: {}", tile_id, outcome.kind(), err);
        }
    }
}
