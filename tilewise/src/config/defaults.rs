//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::catalog::DEFAULT_PAGE_SIZE;
use crate::pipeline::DEFAULT_MAX_IN_FLIGHT;
use crate::search::{DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS};

// =============================================================================
// Catalog
// =============================================================================

/// Default STAC API root.
pub const DEFAULT_CATALOG_URL: &str = "https://planetarycomputer.microsoft.com/api/stac/v1";

/// Default collection searched.
pub const DEFAULT_COLLECTION: &str = "landsat-c2-l2";

/// Default HTTP timeout in seconds.
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Search
// =============================================================================

/// Default time period searched.
pub const DEFAULT_DATETIME: &str = "2023";

// =============================================================================
// Grid
// =============================================================================

/// Default pixel size in metres (Landsat).
pub const DEFAULT_RESOLUTION: f64 = 30.0;

// =============================================================================
// Output
// =============================================================================

pub const DEFAULT_OUTPUT_DIRECTORY: &str = "output";
pub const DEFAULT_OUTPUT_PREFIX: &str = "dep";
pub const DEFAULT_SENSOR: &str = "ls";
pub const DEFAULT_DATASET_ID: &str = "summary";
pub const DEFAULT_VERSION: &str = "0.1.0";

/// Default bands, as Landsat Collection 2 asset keys.
pub const DEFAULT_BANDS: &[&str] = &["red", "nir08"];

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "tilewise.log";

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = config_directory();

        Self {
            catalog: CatalogSettings {
                url: DEFAULT_CATALOG_URL.to_string(),
                collections: vec![DEFAULT_COLLECTION.to_string()],
                timeout: DEFAULT_CATALOG_TIMEOUT_SECS,
                page_size: DEFAULT_PAGE_SIZE,
                retry_attempts: DEFAULT_MAX_ATTEMPTS,
                retry_backoff_ms: DEFAULT_BACKOFF.as_millis() as u64,
            },
            search: SearchSettings {
                datetime: DEFAULT_DATETIME.to_string(),
                suppress_empty: false,
                only_tier_one: false,
                fall_back_to_tier_two: false,
                exclude_platforms: Vec::new(),
                pathrow_index: None,
            },
            grid: GridSettings {
                resolution: DEFAULT_RESOLUTION,
                area: None,
                area_filter: None,
                simplify_tolerance: None,
                buffer: 0.0,
            },
            run: RunSettings {
                continue_on_error: true,
                overwrite: false,
                max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            },
            output: OutputSettings {
                directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
                prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
                sensor: DEFAULT_SENSOR.to_string(),
                dataset_id: DEFAULT_DATASET_ID.to_string(),
                version: DEFAULT_VERSION.to_string(),
                zero_pad_numbers: true,
                bands: DEFAULT_BANDS.iter().map(|b| b.to_string()).collect(),
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE),
            },
        }
    }
}
