//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::parsers::datetime_parser;
use crate::search::LANDSAT_PLATFORMS;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [catalog] section
    if let Some(section) = ini.section(Some("catalog")) {
        if let Some(v) = section.get("url") {
            let v = v.trim().trim_end_matches('/');
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("catalog", "url", v, "must be an http(s) URL"));
            }
            config.catalog.url = v.to_string();
        }
        if let Some(v) = section.get("collections") {
            let collections = parse_list(v);
            if collections.is_empty() {
                return Err(invalid(
                    "catalog",
                    "collections",
                    v,
                    "at least one collection is required",
                ));
            }
            config.catalog.collections = collections;
        }
        if let Some(v) = section.get("timeout") {
            config.catalog.timeout = parse_positive("catalog", "timeout", v)?;
        }
        if let Some(v) = section.get("page_size") {
            config.catalog.page_size = parse_positive("catalog", "page_size", v)?;
        }
        if let Some(v) = section.get("retry_attempts") {
            config.catalog.retry_attempts = parse_positive("catalog", "retry_attempts", v)?;
        }
        if let Some(v) = section.get("retry_backoff_ms") {
            config.catalog.retry_backoff_ms =
                v.trim().parse().map_err(|_| {
                    invalid("catalog", "retry_backoff_ms", v, "must be a non-negative integer")
                })?;
        }
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        if let Some(v) = section.get("datetime") {
            let v = v.trim();
            datetime_parser(v).map_err(|e| invalid("search", "datetime", v, &e.to_string()))?;
            config.search.datetime = v.to_string();
        }
        if let Some(v) = section.get("suppress_empty") {
            config.search.suppress_empty = parse_bool(v);
        }
        if let Some(v) = section.get("only_tier_one") {
            config.search.only_tier_one = parse_bool(v);
        }
        if let Some(v) = section.get("fall_back_to_tier_two") {
            config.search.fall_back_to_tier_two = parse_bool(v);
        }
        if let Some(v) = section.get("exclude_platforms") {
            let platforms = parse_list(v);
            if let Some(unknown) = platforms
                .iter()
                .find(|p| !LANDSAT_PLATFORMS.contains(&p.as_str()))
            {
                return Err(invalid(
                    "search",
                    "exclude_platforms",
                    unknown,
                    &format!("must be one of: {}", LANDSAT_PLATFORMS.join(", ")),
                ));
            }
            config.search.exclude_platforms = platforms;
        }
        if let Some(v) = section.get("pathrow_index") {
            config.search.pathrow_index = parse_optional_path(v);
        }
    }

    // [grid] section
    if let Some(section) = ini.section(Some("grid")) {
        if let Some(v) = section.get("resolution") {
            config.grid.resolution = parse_positive_f64("grid", "resolution", v)?;
        }
        if let Some(v) = section.get("area") {
            config.grid.area = parse_optional_path(v);
        }
        if let Some(v) = section.get("area_filter") {
            let v = v.trim();
            config.grid.area_filter = if v.is_empty() {
                None
            } else {
                match v.split_once('=') {
                    Some((key, value)) if !key.trim().is_empty() => {
                        Some((key.trim().to_string(), value.trim().to_string()))
                    }
                    _ => {
                        return Err(invalid(
                            "grid",
                            "area_filter",
                            v,
                            "expected 'property=value', e.g. 'GID_0=FJI'",
                        ))
                    }
                }
            };
        }
        if let Some(v) = section.get("simplify_tolerance") {
            config.grid.simplify_tolerance = if v.trim().is_empty() {
                None
            } else {
                Some(parse_positive_f64("grid", "simplify_tolerance", v)?)
            };
        }
        if let Some(v) = section.get("buffer") {
            let buffer: f64 = v
                .trim()
                .parse()
                .map_err(|_| invalid("grid", "buffer", v, "must be a number (metres)"))?;
            if !(buffer >= 0.0) {
                return Err(invalid("grid", "buffer", v, "must not be negative"));
            }
            config.grid.buffer = buffer;
        }
    }

    // [run] section
    if let Some(section) = ini.section(Some("run")) {
        if let Some(v) = section.get("continue_on_error") {
            config.run.continue_on_error = parse_bool(v);
        }
        if let Some(v) = section.get("overwrite") {
            config.run.overwrite = parse_bool(v);
        }
        if let Some(v) = section.get("max_in_flight") {
            config.run.max_in_flight = parse_positive("run", "max_in_flight", v)?;
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.directory = expand_tilde(v);
            }
        }
        for (key, field) in [
            ("prefix", &mut config.output.prefix),
            ("sensor", &mut config.output.sensor),
            ("dataset_id", &mut config.output.dataset_id),
            ("version", &mut config.output.version),
        ] {
            if let Some(v) = section.get(key) {
                let v = v.trim();
                if v.is_empty() {
                    return Err(invalid("output", key, v, "must not be empty"));
                }
                *field = v.to_string();
            }
        }
        if let Some(v) = section.get("zero_pad_numbers") {
            config.output.zero_pad_numbers = parse_bool(v);
        }
        if let Some(v) = section.get("bands") {
            let bands = parse_list(v);
            if bands.is_empty() {
                return Err(invalid("output", "bands", v, "at least one band is required"));
            }
            config.output.bands = bands;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(invalid(section, key, value, "must be a positive integer")),
    }
}

fn parse_positive_f64(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Ok(n),
        _ => Err(invalid(section, key, value, "must be a positive number")),
    }
}

/// Splits a comma-separated list, dropping empty entries.
pub(super) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(expand_tilde(value))
    }
}

/// Parse a boolean value from a string.
///
/// Accepts "true", "yes", "1", "on" (case-insensitive) as true.
pub(super) fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "1" | "on"
    )
}

/// Expand `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
