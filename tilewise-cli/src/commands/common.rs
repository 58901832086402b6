//! Tile selection shared by the `run`, `tiles` and `search` commands.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use tilewise::config::GridSettings;
use tilewise::coord::TileId;
use tilewise::grid::{AreaOfInterest, GridDefinition, Tile, TileGrid};

use crate::error::CliError;

/// Arguments selecting which tiles of the grid to work on.
#[derive(Debug, Clone, Default, Args)]
pub struct TileSelection {
    /// Explicit tile ids as `col,row` (repeatable); overrides the area
    #[arg(long = "tile", value_name = "COL,ROW")]
    pub tiles: Vec<String>,

    /// GeoJSON area of interest; overrides `area` in [grid]
    #[arg(long, value_name = "FILE")]
    pub area: Option<PathBuf>,

    /// Output resolution in metres; overrides `resolution` in [grid]
    #[arg(long)]
    pub resolution: Option<f64>,
}

impl TileSelection {
    /// Resolution to build tiles at.
    pub fn resolution(&self, grid: &GridSettings) -> f64 {
        self.resolution.unwrap_or(grid.resolution)
    }

    /// Build the selected tiles.
    ///
    /// Explicit ids win over an area of interest; with neither, every tile
    /// of the grid is returned.
    pub fn build(&self, grid: &GridSettings) -> Result<Vec<Tile>, CliError> {
        let resolution = self.resolution(grid);
        let mut tile_grid = TileGrid::new(GridDefinition::pacific()).with_buffer(grid.buffer);
        if let Some(tolerance) = grid.simplify_tolerance {
            tile_grid = tile_grid.with_simplify_tolerance(tolerance);
        }

        if !self.tiles.is_empty() {
            let ids = parse_tile_ids(&self.tiles)?;
            return ids
                .iter()
                .map(|id| tile_grid.tile(id, resolution).map_err(CliError::from))
                .collect();
        }

        let area_path = self.area.as_ref().or(grid.area.as_ref());
        let tiles = match area_path {
            Some(path) => {
                let filter = grid
                    .area_filter
                    .as_ref()
                    .map(|(key, value)| (key.as_str(), value.as_str()));
                let area = AreaOfInterest::from_geojson_file(path, filter)?;
                info!(area = %path.display(), "Loaded area of interest");
                tile_grid.tiles_intersecting(resolution, &area)?
            }
            None => tile_grid.tiles_for(resolution)?,
        };

        info!(tiles = tiles.len(), resolution, "Selected tiles");
        Ok(tiles)
    }
}

/// Parse `col,row` strings into grid tile ids.
pub fn parse_tile_ids(raw: &[String]) -> Result<Vec<TileId>, CliError> {
    raw.iter()
        .map(|s| match s.parse::<TileId>() {
            Ok(id @ TileId::Grid { .. }) => Ok(id),
            Ok(other) => Err(CliError::InvalidArgument(format!(
                "tile '{}' is not a grid tile id (expected col,row)",
                other
            ))),
            Err(e) => Err(CliError::InvalidArgument(e.to_string())),
        })
        .collect()
}
