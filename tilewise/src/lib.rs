//! tilewise - Tiled-area batch processing of satellite imagery catalogs
//!
//! This library splits a region into a fixed grid of tiles and, for each
//! tile, searches a STAC catalog, loads the matching scenes, runs a
//! transform and writes the result with catalog metadata. Tiles fail,
//! skip or complete independently; a run survives flaky searches and bad
//! upstream metadata, and tiles straddling the antimeridian are searched
//! as two non-wrapping boxes.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilewise::catalog::StacApiClient;
//! use tilewise::grid::{GridDefinition, TileGrid};
//! use tilewise::pipeline::{AssetLoader, Runner, RunnerConfig, StacItemWriter, Task,
//!     TemporalSummaryProcessor};
//! use tilewise::search::StacSearcher;
//!
//! let client = StacApiClient::new("https://planetarycomputer.microsoft.com/api/stac/v1", 30)?;
//! let searcher = StacSearcher::new(client, vec!["landsat-c2-l2".into()]).with_datetime("2023");
//! let task = Task::new(
//!     Arc::new(searcher),
//!     Arc::new(AssetLoader::new(["red", "nir08"])),
//!     Arc::new(TemporalSummaryProcessor::new(["red", "nir08"])),
//!     Arc::new(StacItemWriter::new(item_path)),
//! );
//! let tiles = TileGrid::new(GridDefinition::pacific()).tiles_for(30.0)?;
//! let report = Runner::new(task, RunnerConfig::default())
//!     .run(tiles.into_iter().map(|t| t.into_parts()))
//!     .await?;
//! ```

pub mod antimeridian;
pub mod catalog;
pub mod config;
pub mod coord;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod naming;
pub mod parsers;
pub mod pipeline;
pub mod proj;
pub mod search;

/// Version of the tilewise library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
