//! Reading and writing `config.ini`.
//!
//! A missing file means "all defaults"; a present file only needs the keys
//! it wants to change. Field layout is in [`super::settings`], validation in
//! [`super::parser`] and the commented output format in [`super::writer`].

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

pub use super::settings::*;

/// Errors from loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// File exists but is not valid INI
    #[error("Cannot parse config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Cannot write config file: {0}")]
    WriteError(String),

    /// A key is present but its value is unusable
    #[error("Invalid setting {section}.{key} = '{value}': {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Cannot create directory for config file: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Reads `path`, falling back to [`ConfigFile::default`] when it is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        match Ini::load_from_file(path) {
            Ok(ini) => super::parser::parse_ini(&ini),
            Err(ini::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the commented INI form to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(ConfigFileError::DirectoryError)?;
        }
        fs::write(path, self.to_ini_string())
            .map_err(|e| ConfigFileError::WriteError(format!("{}: {}", path.display(), e)))
    }

    /// Commented INI text, as written by [`ConfigFile::save_to`].
    pub fn to_ini_string(&self) -> String {
        super::writer::to_config_string(self)
    }
}

/// `~/.tilewise`, or `./.tilewise` when there is no home directory.
pub fn config_directory() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".tilewise")
}

/// `~/.tilewise/config.ini`
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_constants() {
        let defaults = ConfigFile::default();

        assert_eq!(defaults.catalog.collections, vec![DEFAULT_COLLECTION]);
        assert_eq!(defaults.catalog.retry_attempts, 10);
        assert_eq!(defaults.catalog.retry_backoff_ms, 1000);
        assert!(defaults.run.continue_on_error);
        assert!(!defaults.run.overwrite);
        assert!(defaults.logging.file.ends_with(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.ini");

        assert_eq!(ConfigFile::load_from(&missing).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_saved_file_reloads_identically() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("config.ini");

        let mut custom = ConfigFile::default();
        custom.catalog.url = "https://earth-search.aws.element84.com/v1".to_string();
        custom.run.max_in_flight = 16;
        custom.save_to(&target).unwrap();

        assert_eq!(ConfigFile::load_from(&target).unwrap(), custom);
    }

    #[test]
    fn test_bad_value_names_section_and_key() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("config.ini");
        fs::write(&target, "[run]\nmax_in_flight = lots\n").unwrap();

        let err = ConfigFile::load_from(&target).unwrap_err();
        assert!(err.to_string().contains("run.max_in_flight"));
    }

    #[test]
    fn test_retry_policy_and_runner_config() {
        let defaults = ConfigFile::default();
        assert_eq!(
            defaults.catalog.retry_policy(),
            crate::search::RetryPolicy::default()
        );
        assert_eq!(defaults.run.runner_config().max_in_flight, 4);
    }
}
