//! Search command - show the catalog items found for single tiles.
//!
//! Runs the same antimeridian-aware search the pipeline uses, without
//! loading or writing anything.

use std::sync::Arc;

use clap::Args;
use tracing::info;

use tilewise::catalog::ItemCollection;
use tilewise::grid::Tile;
use tilewise::search::{SearchError, Searcher};

use super::common::TileSelection;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the search command.
#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub selection: TileSelection,

    /// Single year to search; overrides `datetime` in [search]
    #[arg(long)]
    pub datetime: Option<String>,

    /// Print the matching items as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the search command.
pub async fn run(runner: CliRunner, args: SearchArgs) -> Result<(), CliError> {
    runner.log_startup("search");

    if args.selection.tiles.is_empty() {
        return Err(CliError::InvalidArgument(
            "search needs at least one --tile".to_string(),
        ));
    }

    let datetime = args
        .datetime
        .clone()
        .unwrap_or_else(|| runner.config().search.datetime.clone());
    let tiles = args.selection.build(&runner.config().grid)?;

    let client = runner.create_client()?;
    let searcher = runner.stac_searcher(Arc::clone(&client), &datetime);

    if runner.wants_pathrow_search() {
        let index = runner.load_pathrow_index()?;
        let searcher = runner.pathrow_searcher(searcher, index);
        search_tiles(&searcher, tiles, args.json).await
    } else {
        search_tiles(&searcher, tiles, args.json).await
    }
}

async fn search_tiles<S: Searcher>(
    searcher: &S,
    tiles: Vec<Tile>,
    json: bool,
) -> Result<(), CliError> {
    for tile in tiles {
        let (tile_id, area) = tile.into_parts();
        match searcher.search(&tile_id, &area).await {
            Ok(items) => {
                info!(tile = %tile_id, items = items.len(), "Search finished");
                print_items(&tile_id.to_string(), &items, json)?;
            }
            Err(SearchError::EmptyCollection) => println!("{}: no items", tile_id),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn print_items(tile: &str, items: &ItemCollection, json: bool) -> Result<(), CliError> {
    if json {
        let listed: Vec<_> = items.iter().collect();
        let text = serde_json::to_string_pretty(&serde_json::json!({
            "tile": tile,
            "items": listed,
        }))
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    println!("{}: {} items", tile, items.len());
    for item in items.iter() {
        let datetime = item
            .datetime()
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!("  {}  {}", datetime, item.id);
    }
    Ok(())
}
