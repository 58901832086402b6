//! User configuration.
//!
//! Settings are read from an INI file at `~/.tilewise/config.ini` with one
//! section per concern. Missing keys fall back to the values in
//! [`defaults`]; present but invalid values are rejected with the section
//! and key that caused them.
//!
//! # Example
//!
//! ```
//! use tilewise::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let runner_config = config.run.runner_config();
//! assert!(runner_config.continue_on_error);
//! ```

pub mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CatalogSettings, ConfigFile, GridSettings, LoggingSettings, OutputSettings, RunSettings,
    SearchSettings,
};
