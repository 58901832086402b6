//! Landsat pathrow searching.
//!
//! Landsat scenes are framed on the fixed WRS-2 path/row grid. Searching by
//! pathrow rather than by tile footprint sidesteps items whose own
//! geometries are wrong near the antimeridian: the searcher finds every
//! pathrow touching the tile, searches their combined footprint, then keeps
//! only items framed on one of those pathrows.

use std::path::Path;
use std::sync::Arc;

use geo::{Intersects, MultiPolygon};
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};

use crate::antimeridian::{split, SearchBounds};
use crate::catalog::{CatalogClient, CatalogItem, ItemCollection};
use crate::coord::{zero_pad3, TileId};
use crate::geometry::{feature_polygons, parse_features, property_string, TileGeometry};

use super::stac::merge_filter;
use super::{SearchError, Searcher, StacSearcher};

/// Platforms carried by the Landsat collection 2 catalog.
pub const LANDSAT_PLATFORMS: &[&str] = &["landsat-5", "landsat-7", "landsat-8", "landsat-9"];

const WRS_PATH: &str = "landsat:wrs_path";
const WRS_ROW: &str = "landsat:wrs_row";
const COLLECTION_CATEGORY: &str = "landsat:collection_category";

#[derive(Debug, Clone)]
struct PathrowCell {
    path: u16,
    row: u16,
    footprint: MultiPolygon<f64>,
    bounds: SearchBounds,
}

/// WRS-2 pathrow footprints.
#[derive(Debug, Clone, Default)]
pub struct PathrowIndex {
    cells: Vec<PathrowCell>,
}

impl PathrowIndex {
    /// Reads footprints from GeoJSON features carrying `PATH` and `ROW`
    /// properties.
    pub fn from_geojson(text: &str) -> Result<Self, SearchError> {
        let mut cells = Vec::new();
        for feature in parse_features(text)? {
            let (Some(path), Some(row)) = (
                property_string(&feature, "PATH").and_then(|p| p.parse::<u16>().ok()),
                property_string(&feature, "ROW").and_then(|r| r.parse::<u16>().ok()),
            ) else {
                continue;
            };
            let polygons = feature_polygons(&feature)?;
            if polygons.is_empty() {
                continue;
            }
            let footprint = MultiPolygon::new(polygons);
            let bounds = split(&TileGeometry::geographic(footprint.clone()))?;
            cells.push(PathrowCell {
                path,
                row,
                footprint,
                bounds,
            });
        }
        debug!(cells = cells.len(), "Built pathrow index");
        Ok(Self { cells })
    }

    pub fn from_geojson_file(path: &Path) -> Result<Self, SearchError> {
        let text = std::fs::read_to_string(path).map_err(|e| SearchError::Index {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let index = Self::from_geojson(&text)?;
        info!(path = %path.display(), cells = index.len(), "Loaded pathrow index");
        Ok(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Pathrows whose footprint touches any of the boxes.
    pub fn intersecting(&self, bounds: &SearchBounds) -> Vec<(u16, u16)> {
        let boxes = bounds.boxes();
        self.cells
            .iter()
            .filter(|cell| {
                boxes.iter().any(|b| {
                    if !cell.bounds.intersects(b) {
                        return false;
                    }
                    // Footprints cut at 180° are matched on their boxes alone
                    cell.bounds.is_split() || cell.footprint.intersects(&b.to_rect())
                })
            })
            .map(|cell| (cell.path, cell.row))
            .collect()
    }

    /// Search bounds covering the given pathrows' footprints.
    pub fn bounds_of(&self, pathrows: &[(u16, u16)]) -> Result<Option<SearchBounds>, SearchError> {
        let polygons: Vec<_> = self
            .cells
            .iter()
            .filter(|cell| pathrows.contains(&(cell.path, cell.row)))
            .flat_map(|cell| cell.footprint.0.iter().cloned())
            .collect();
        if polygons.is_empty() {
            return Ok(None);
        }
        let combined = TileGeometry::geographic(MultiPolygon::new(polygons));
        Ok(Some(split(&combined)?))
    }
}

/// Returns true if the item is framed on one of `pathrows`.
fn in_pathrows(item: &CatalogItem, pathrows: &[(u16, u16)]) -> bool {
    let (Some(path), Some(row)) = (item.property_str(WRS_PATH), item.property_str(WRS_ROW)) else {
        return false;
    };
    let (path, row) = (zero_pad3(path), zero_pad3(row));
    pathrows
        .iter()
        .any(|(p, r)| zero_pad3(p) == path && zero_pad3(r) == row)
}

/// A [`StacSearcher`] specialised for Landsat collection 2.
///
/// Adds pathrow targeting, platform exclusion and a tier-one-first search
/// that can fall back to tier two when tier one has nothing.
pub struct PathrowSearcher<C> {
    inner: StacSearcher<C>,
    index: Option<Arc<PathrowIndex>>,
    exclude_platforms: Vec<String>,
    only_tier_one: bool,
    fall_back_to_tier_two: bool,
}

impl<C: CatalogClient> PathrowSearcher<C> {
    /// Wraps a searcher; its collections, datetime and retry policy apply.
    pub fn new(inner: StacSearcher<C>) -> Self {
        Self {
            inner,
            index: None,
            exclude_platforms: Vec::new(),
            only_tier_one: false,
            fall_back_to_tier_two: false,
        }
    }

    /// Search the footprints of the pathrows touching each tile instead of
    /// the tile itself.
    pub fn with_index(mut self, index: Arc<PathrowIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_exclude_platforms(mut self, platforms: Vec<String>) -> Self {
        self.exclude_platforms = platforms;
        self
    }

    pub fn with_only_tier_one(mut self, only_tier_one: bool) -> Self {
        self.only_tier_one = only_tier_one;
        self
    }

    pub fn with_fall_back_to_tier_two(mut self, fall_back: bool) -> Self {
        self.fall_back_to_tier_two = fall_back;
        self
    }

    /// Filters for one search attempt.
    fn filters(&self, tier_one: bool) -> Map<String, Value> {
        let mut filters = self.inner.filters().clone();
        if !self.exclude_platforms.is_empty() {
            let platforms: Vec<&str> = LANDSAT_PLATFORMS
                .iter()
                .copied()
                .filter(|p| !self.exclude_platforms.iter().any(|x| x == p))
                .collect();
            merge_filter(&mut filters, "platform".to_string(), json!({ "in": platforms }));
        }
        if tier_one {
            merge_filter(
                &mut filters,
                COLLECTION_CATEGORY.to_string(),
                json!({ "eq": "T1" }),
            );
        }
        filters
    }

    /// Pathrows to keep items from, if any restriction applies.
    fn target_pathrows(&self, tile_id: &TileId, bounds: &SearchBounds) -> Option<Vec<(u16, u16)>> {
        if let Some(pathrow) = tile_id.as_pathrow() {
            return Some(vec![pathrow]);
        }
        self.index.as_ref().map(|index| index.intersecting(bounds))
    }
}

impl<C: CatalogClient> Searcher for PathrowSearcher<C> {
    #[instrument(skip(self, area), fields(tile = %tile_id))]
    async fn search(
        &self,
        tile_id: &TileId,
        area: &TileGeometry,
    ) -> Result<ItemCollection, SearchError> {
        let tile_bounds = split(area)?;
        let targets = self.target_pathrows(tile_id, &tile_bounds);

        let bounds = match (&targets, &self.index) {
            (Some(pathrows), Some(index)) if !pathrows.is_empty() => {
                index.bounds_of(pathrows)?.unwrap_or(tile_bounds)
            }
            (Some(pathrows), _) if pathrows.is_empty() => {
                debug!("No pathrows touch the tile");
                return self.inner.check_empty(ItemCollection::new());
            }
            _ => tile_bounds,
        };

        let mut items = self.inner.collect(&bounds, &self.filters(self.only_tier_one)).await?;
        if items.is_empty() && self.only_tier_one && self.fall_back_to_tier_two {
            info!("No tier one items, falling back to tier two");
            items = self.inner.collect(&bounds, &self.filters(false)).await?;
        }

        if let Some(pathrows) = &targets {
            let before = items.len();
            items.retain(|item| in_pathrows(item, pathrows));
            debug!(before, after = items.len(), pathrows = pathrows.len(), "Filtered to pathrows");
        }

        self.inner.check_empty(items)
    }
}
