//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::naming::ItemPath;
use crate::pipeline::RunnerConfig;
use crate::search::RetryPolicy;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// STAC API and retry settings
    pub catalog: CatalogSettings,
    /// Search filters
    pub search: SearchSettings,
    /// Tiling settings
    pub grid: GridSettings,
    /// Run behaviour
    pub run: RunSettings,
    /// Output naming
    pub output: OutputSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Catalog configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    /// STAC API root URL
    pub url: String,
    /// Collections to search
    pub collections: Vec<String>,
    /// Timeout in seconds for HTTP requests
    pub timeout: u64,
    /// Items requested per page
    pub page_size: u32,
    /// Attempts per catalog query before giving up
    pub retry_attempts: u32,
    /// Wait between attempts, in milliseconds
    pub retry_backoff_ms: u64,
}

impl CatalogSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Year, year range (`1990_1995`) or RFC 3339 interval
    pub datetime: String,
    /// Return empty results instead of skipping tiles
    pub suppress_empty: bool,
    /// Landsat: only Tier 1 scenes
    pub only_tier_one: bool,
    /// Landsat: retry without the tier filter when Tier 1 is empty
    pub fall_back_to_tier_two: bool,
    /// Landsat platforms to leave out, e.g. `landsat-7`
    pub exclude_platforms: Vec<String>,
    /// WRS-2 footprints; enables pathrow filtering for grid tiles
    pub pathrow_index: Option<PathBuf>,
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    /// Pixel size in metres; must divide the tile side
    pub resolution: f64,
    /// GeoJSON area of interest; the whole grid when unset
    pub area: Option<PathBuf>,
    /// `property=value` filter applied to the area's features
    pub area_filter: Option<(String, String)>,
    /// Simplification tolerance for the area, in degrees
    pub simplify_tolerance: Option<f64>,
    /// Grid-CRS distance tiles may lie outside the area and still be selected
    pub buffer: f64,
}

/// Run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub continue_on_error: bool,
    pub overwrite: bool,
    /// Tiles processed at once
    pub max_in_flight: usize,
}

impl RunSettings {
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            continue_on_error: self.continue_on_error,
            overwrite: self.overwrite,
            max_in_flight: self.max_in_flight,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Root directory for outputs and logs
    pub directory: PathBuf,
    pub prefix: String,
    pub sensor: String,
    pub dataset_id: String,
    pub version: String,
    /// Zero-pad numeric tile id parts to three digits
    pub zero_pad_numbers: bool,
    /// Asset keys loaded and written per tile
    pub bands: Vec<String>,
}

impl OutputSettings {
    /// Naming scheme for one time period.
    pub fn item_path(&self, time: &str) -> ItemPath {
        ItemPath::new(&self.sensor, &self.dataset_id, &self.version, time)
            .with_prefix(&self.prefix)
            .with_zero_pad_numbers(self.zero_pad_numbers)
            .with_root(self.directory.to_string_lossy())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
