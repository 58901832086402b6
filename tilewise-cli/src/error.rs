//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use tilewise::catalog::CatalogError;
use tilewise::config::ConfigFileError;
use tilewise::grid::GridError;
use tilewise::pipeline::{RunError, TaskError};
use tilewise::search::SearchError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Configuration file could not be read or written
    ConfigFile(ConfigFileError),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Tiles could not be built
    Grid(GridError),
    /// Catalog client could not be created
    Catalog(CatalogError),
    /// Search for a single tile failed
    Search(SearchError),
    /// A run stopped before processing every tile
    Run(RunError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Run(RunError::Halted {
                source: TaskError::UnsupportedGeometry(_),
                ..
            }) => {
                eprintln!();
                eprintln!("Tile footprints must be polygons or lines.");
                eprintln!("Check the area of interest file and the grid definition.");
            }
            CliError::Run(RunError::Halted { report, .. }) => {
                eprintln!();
                eprintln!("Processed before stopping: {}", report);
                eprintln!("Set continue_on_error = true in [run] to keep going past failures.");
            }
            CliError::Search(SearchError::Catalog { .. }) | CliError::Catalog(_) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Catalog URL: check url in the [catalog] section");
                eprintln!("  2. Network: the STAC API may be down or rate limiting");
                eprintln!("  3. Timeouts: raise timeout or retry_attempts in [catalog]");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Grid(e) => write!(f, "Failed to build tiles: {}", e),
            CliError::Catalog(e) => write!(f, "Failed to create catalog client: {}", e),
            CliError::Search(e) => write!(f, "Search failed: {}", e),
            CliError::Run(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Grid(e) => Some(e),
            CliError::Catalog(e) => Some(e),
            CliError::Search(e) => Some(e),
            CliError::Run(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<GridError> for CliError {
    fn from(e: GridError) -> Self {
        CliError::Grid(e)
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<SearchError> for CliError {
    fn from(e: SearchError) -> Self {
        CliError::Search(e)
    }
}

impl From<RunError> for CliError {
    fn from(e: RunError) -> Self {
        CliError::Run(e)
    }
}
