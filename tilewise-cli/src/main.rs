//! tilewise CLI - Command-line interface
//!
//! Splits a region into grid tiles and builds one summary product per tile
//! from a STAC catalog.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::run::RunArgs;
use commands::search::SearchArgs;
use commands::tiles::TilesArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "tilewise")]
#[command(version = tilewise::VERSION)]
#[command(about = "Tiled-area batch processing of satellite imagery catalogs", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.tilewise/config.ini
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, load, summarise and write every selected tile
    Run(RunArgs),

    /// List the selected tiles and their search bounds
    Tiles(TilesArgs),

    /// Show the catalog items found for single tiles
    Search(SearchArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        e.exit();
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Config(command) => commands::config::run(command, config_path),
        Commands::Run(args) => {
            let runner = CliRunner::new(config_path, cli.debug)?;
            commands::run::run(runner, args).await
        }
        Commands::Tiles(args) => {
            let runner = CliRunner::new(config_path, cli.debug)?;
            commands::tiles::run(runner, args)
        }
        Commands::Search(args) => {
            let runner = CliRunner::new(config_path, cli.debug)?;
            commands::search::run(runner, args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::common::parse_tile_ids;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "tilewise",
            "--debug",
            "run",
            "--tile",
            "66,22",
            "--tile",
            "0,5",
            "--datetime",
            "2020_2022",
            "--fail-fast",
        ])
        .unwrap();

        assert!(cli.debug);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.selection.tiles.len(), 2);
        assert_eq!(args.datetime.as_deref(), Some("2020_2022"));
        assert!(args.fail_fast);
        assert!(!args.overwrite);
        assert!(parse_tile_ids(&args.selection.tiles).is_ok());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["tilewise", "tiles", "--config", "/tmp/c.ini", "--crossing"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.ini")));
        let Commands::Tiles(args) = cli.command else {
            panic!("expected tiles");
        };
        assert!(args.crossing);
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["tilewise", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Init { force: true })
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["tilewise"]).is_err());
    }
}
