//! Tiles command - list the selected tiles and their search bounds.

use clap::Args;

use tilewise::antimeridian::split;

use super::common::TileSelection;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the tiles command.
#[derive(Debug, Clone, Default, Args)]
pub struct TilesArgs {
    #[command(flatten)]
    pub selection: TileSelection,

    /// Only list tiles that cross the antimeridian
    #[arg(long)]
    pub crossing: bool,
}

/// Run the tiles command.
pub fn run(runner: CliRunner, args: TilesArgs) -> Result<(), CliError> {
    runner.log_startup("tiles");

    let tiles = args.selection.build(&runner.config().grid)?;
    let mut listed = 0;
    for tile in &tiles {
        let bounds = split(tile.geometry()).map_err(tilewise::grid::GridError::from)?;
        if args.crossing && !bounds.is_split() {
            continue;
        }
        println!("{:>8}  {}", tile.id(), bounds);
        listed += 1;
    }

    println!();
    println!("{} of {} tiles", listed, tiles.len());
    Ok(())
}
