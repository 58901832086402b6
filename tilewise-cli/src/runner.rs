//! Per-invocation setup shared by the commands.
//!
//! Loads `config.ini`, starts logging and builds the catalog client and
//! searchers from the loaded settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use tilewise::catalog::StacApiClient;
use tilewise::config::{config_file_path, ConfigFile};
use tilewise::logging::{default_log_file, init_logging, LoggingGuard};
use tilewise::search::{PathrowIndex, PathrowSearcher, StacSearcher};

use crate::error::CliError;

/// Loaded settings plus the logging guard for one CLI invocation.
pub struct CliRunner {
    /// Flushes the log file on drop
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Loads the config file and starts logging to the file it names.
    ///
    /// Logs are mirrored to stdout only when stdout is not a terminal, so
    /// interactive runs show progress lines instead of log noise.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Config file to load instead of `~/.tilewise/config.ini`
    /// * `debug_mode` - Log tilewise at debug level when RUST_LOG is unset
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| default_log_file().to_string());

        let stdout_enabled = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(&log_dir, &log_file, stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Records version and config path at the start of a command.
    pub fn log_startup(&self, command: &str) {
        info!("tilewise v{}", tilewise::VERSION);
        info!(config = %self.config_path.display(), "tilewise CLI: {} command", command);
    }

    /// Create the STAC API client from `[catalog]`.
    pub fn create_client(&self) -> Result<Arc<StacApiClient>, CliError> {
        let catalog = &self.config.catalog;
        let client = StacApiClient::new(&catalog.url, catalog.timeout)?
            .with_page_size(catalog.page_size);
        info!(url = %catalog.url, "Catalog client created");
        Ok(Arc::new(client))
    }

    /// Create the general searcher for one time period.
    pub fn stac_searcher(
        &self,
        client: Arc<StacApiClient>,
        datetime: &str,
    ) -> StacSearcher<Arc<StacApiClient>> {
        let catalog = &self.config.catalog;
        StacSearcher::new(client, catalog.collections.clone())
            .with_datetime(datetime)
            .with_retry_policy(catalog.retry_policy())
            .with_suppress_empty(self.config.search.suppress_empty)
    }

    /// Returns true when `[search]` asks for Landsat pathrow handling.
    pub fn wants_pathrow_search(&self) -> bool {
        let search = &self.config.search;
        search.only_tier_one
            || search.fall_back_to_tier_two
            || !search.exclude_platforms.is_empty()
            || search.pathrow_index.is_some()
    }

    /// Wrap a searcher with the Landsat filters from `[search]`.
    pub fn pathrow_searcher(
        &self,
        inner: StacSearcher<Arc<StacApiClient>>,
        index: Option<Arc<PathrowIndex>>,
    ) -> PathrowSearcher<Arc<StacApiClient>> {
        let search = &self.config.search;
        let mut searcher = PathrowSearcher::new(inner)
            .with_exclude_platforms(search.exclude_platforms.clone())
            .with_only_tier_one(search.only_tier_one)
            .with_fall_back_to_tier_two(search.fall_back_to_tier_two);
        if let Some(index) = index {
            searcher = searcher.with_index(index);
        }
        searcher
    }

    /// Load the WRS-2 index named in `[search]`, if any.
    pub fn load_pathrow_index(&self) -> Result<Option<Arc<PathrowIndex>>, CliError> {
        match &self.config.search.pathrow_index {
            Some(path) => {
                let index = PathrowIndex::from_geojson_file(path)?;
                info!(path = %path.display(), cells = index.len(), "Loaded pathrow index");
                Ok(Some(Arc::new(index)))
            }
            None => Ok(None),
        }
    }
}
