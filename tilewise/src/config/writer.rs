//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let pathrow_index = optional_path(config.search.pathrow_index.as_deref());
    let area = optional_path(config.grid.area.as_deref());
    let area_filter = config
        .grid
        .area_filter
        .as_ref()
        .map(|(k, v)| format!("{}={}", k, v))
        .unwrap_or_default();
    let simplify_tolerance = config
        .grid
        .simplify_tolerance
        .map(|t| t.to_string())
        .unwrap_or_default();

    format!(
        r#"[catalog]
; STAC API root URL
url = {}
; Comma-separated collections to search
collections = {}
; Timeout in seconds for HTTP requests (default: 30)
timeout = {}
; Items requested per page (default: 100)
page_size = {}
; Attempts per catalog query before a tile fails (default: 10)
retry_attempts = {}
; Wait between attempts in milliseconds (default: 1000)
retry_backoff_ms = {}

[search]
; Year (2023), year range (1990_1995) or RFC 3339 interval
datetime = {}
; Process tiles with no items instead of skipping them (default: false)
suppress_empty = {}
; Landsat only: restrict to Tier 1 scenes (default: false)
only_tier_one = {}
; Landsat only: retry without the tier restriction when Tier 1 is empty (default: false)
fall_back_to_tier_two = {}
; Landsat only: comma-separated platforms to exclude, e.g. landsat-7
exclude_platforms = {}
; WRS-2 footprints GeoJSON with PATH and ROW properties (optional)
pathrow_index = {}

[grid]
; Pixel size in metres; must divide the 96000 m tile side (default: 30)
resolution = {}
; Area of interest GeoJSON; empty processes the whole grid
area = {}
; Keep only area features whose property matches, e.g. GID_0=FJI
area_filter = {}
; Simplify the area before intersecting, in degrees (optional)
simplify_tolerance = {}
; Also select tiles within this many metres of the area (default: 0)
buffer = {}

[run]
; Keep going after a tile fails (default: true)
continue_on_error = {}
; Redo tiles whose outputs already exist (default: false)
overwrite = {}
; Tiles processed at once (default: 4)
max_in_flight = {}

[output]
; Root directory for outputs and tile logs
directory = {}
; Products are named {{prefix}}_{{sensor}}_{{dataset_id}}/{{version}}
prefix = {}
sensor = {}
dataset_id = {}
version = {}
; Zero-pad numeric tile id parts to three digits (default: true)
zero_pad_numbers = {}
; Comma-separated asset keys loaded and written per tile
bands = {}

[logging]
; Log file path (default: ~/.tilewise/tilewise.log)
file = {}
"#,
        config.catalog.url,
        config.catalog.collections.join(", "),
        config.catalog.timeout,
        config.catalog.page_size,
        config.catalog.retry_attempts,
        config.catalog.retry_backoff_ms,
        config.search.datetime,
        config.search.suppress_empty,
        config.search.only_tier_one,
        config.search.fall_back_to_tier_two,
        config.search.exclude_platforms.join(", "),
        pathrow_index,
        config.grid.resolution,
        area,
        area_filter,
        simplify_tolerance,
        config.grid.buffer,
        config.run.continue_on_error,
        config.run.overwrite,
        config.run.max_in_flight,
        path_to_string(&config.output.directory),
        config.output.prefix,
        config.output.sensor,
        config.output.dataset_id,
        config.output.version,
        config.output.zero_pad_numbers,
        config.output.bands.join(", "),
        path_to_string(&config.logging.file),
    )
}

fn optional_path(path: Option<&Path>) -> String {
    path.map(path_to_string).unwrap_or_default()
}

/// Convert a path to a string, collapsing the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
