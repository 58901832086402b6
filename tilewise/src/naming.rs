//! Output path naming.
//!
//! Every product lives under `{prefix}_{sensor}_{dataset}/{version}/`,
//! followed by the tile id parts and the time period:
//!
//! ```text
//! dep_ls_wofs/1-0-1/001/002/2045/dep_ls_wofs_001_002_2045_mean.tif
//! ```
//!
//! Versions have their dots replaced by dashes and numeric id parts are
//! zero-padded to three digits, so paths sort naturally.

use crate::coord::{zero_pad3, TileId};

/// Default file extension for raster outputs.
pub const RASTER_EXTENSION: &str = ".tif";

/// Extension for per-tile STAC item documents.
pub const STAC_EXTENSION: &str = ".stac-item.json";

/// Builds output paths for one product and time period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPath {
    prefix: String,
    sensor: String,
    dataset_id: String,
    version: String,
    time: String,
    zero_pad_numbers: bool,
    root: Option<String>,
}

impl ItemPath {
    /// Creates a naming scheme with the `dep` prefix and zero padding on.
    pub fn new(
        sensor: impl Into<String>,
        dataset_id: impl Into<String>,
        version: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            prefix: "dep".to_string(),
            sensor: sensor.into(),
            dataset_id: dataset_id.into(),
            version: version.into().replace('.', "-"),
            time: time.into(),
            zero_pad_numbers: true,
            root: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_zero_pad_numbers(mut self, pad: bool) -> Self {
        self.zero_pad_numbers = pad;
        self
    }

    /// Places every path under `root` (a directory or bucket prefix).
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        let root = root.into();
        self.root = Some(root.trim_end_matches('/').to_string()).filter(|r| !r.is_empty());
        self
    }

    /// Returns a copy for a different time period.
    pub fn for_time(&self, time: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            ..self.clone()
        }
    }

    #[inline]
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Version with dots replaced by dashes.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `{prefix}_{sensor}_{dataset}` with any `/` in the dataset id
    /// flattened to `_`.
    pub fn item_prefix(&self) -> String {
        format!(
            "{}_{}_{}",
            self.prefix,
            self.sensor,
            self.dataset_id.replace('/', "_")
        )
    }

    /// Product directory, `[{root}/]{prefix}_{sensor}_{dataset}/{version}`.
    pub fn folder_prefix(&self) -> String {
        let product = format!(
            "{}_{}_{}/{}",
            self.prefix, self.sensor, self.dataset_id, self.version
        );
        match &self.root {
            Some(root) => format!("{}/{}", root, product),
            None => product,
        }
    }

    fn format_id(&self, tile_id: &TileId, separator: &str) -> String {
        tile_id
            .parts()
            .into_iter()
            .map(|part| {
                let numeric = !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
                if numeric && self.zero_pad_numbers {
                    zero_pad3(part)
                } else {
                    part
                }
            })
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Directory holding a tile's outputs.
    pub fn folder(&self, tile_id: &TileId) -> String {
        format!(
            "{}/{}/{}",
            self.folder_prefix(),
            self.format_id(tile_id, "/"),
            self.time
        )
    }

    /// File name stem shared by a tile's outputs.
    pub fn basename(&self, tile_id: &TileId) -> String {
        format!(
            "{}_{}_{}",
            self.item_prefix(),
            self.format_id(tile_id, "_"),
            self.time
        )
    }

    /// Path of one output. `variable` names the band or statistic.
    pub fn path(&self, tile_id: &TileId, variable: Option<&str>, extension: &str) -> String {
        match variable {
            Some(variable) => format!(
                "{}/{}_{}{}",
                self.folder(tile_id),
                self.basename(tile_id),
                variable,
                extension
            ),
            None => format!(
                "{}/{}{}",
                self.folder(tile_id),
                self.basename(tile_id),
                extension
            ),
        }
    }

    /// Raster path for one variable.
    pub fn raster_path(&self, tile_id: &TileId, variable: &str) -> String {
        self.path(tile_id, Some(variable), RASTER_EXTENSION)
    }

    /// Path of the tile's STAC item document.
    pub fn stac_path(&self, tile_id: &TileId) -> String {
        self.path(tile_id, None, STAC_EXTENSION)
    }

    /// Path of the run's per-tile outcome log.
    pub fn log_path(&self) -> String {
        format!(
            "{}/logs/{}_{}_log.csv",
            self.folder_prefix(),
            self.item_prefix(),
            self.time
        )
    }
}
