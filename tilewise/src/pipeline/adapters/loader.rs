//! Band href resolution.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::antimeridian::{split, SearchBounds};
use crate::catalog::{CatalogItem, ItemCollection};
use crate::geometry::TileGeometry;
use crate::pipeline::{Loader, StageError};

/// One catalog item reduced to what a raster reader needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub item_id: String,
    pub collection: Option<String>,
    pub datetime: Option<DateTime<Utc>>,
    pub epsg: Option<i64>,
    /// Band name -> asset href, for the requested bands the item has
    pub bands: BTreeMap<String, String>,
}

impl Scene {
    fn from_item(item: &CatalogItem, bands: &[String]) -> Self {
        let bands = bands
            .iter()
            .filter_map(|band| {
                item.assets
                    .get(band)
                    .map(|asset| (band.clone(), asset.href.clone()))
            })
            .collect();
        Self {
            item_id: item.id.clone(),
            collection: item.collection.clone(),
            datetime: item.datetime(),
            epsg: item.epsg(),
            bands,
        }
    }

    /// Returns true if the scene has an href for every band in `bands`.
    pub fn has_bands(&self, bands: &[String]) -> bool {
        bands.iter().all(|band| self.bands.contains_key(band))
    }
}

/// Scenes covering one tile, oldest first.
#[derive(Debug, Clone)]
pub struct SceneStack {
    pub scenes: Vec<Scene>,
    /// Geographic bounds of the tile, split at 180° when it crosses
    pub bounds: SearchBounds,
}

impl SceneStack {
    #[inline]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// Loader resolving the requested bands of each item.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    bands: Vec<String>,
}

impl AssetLoader {
    pub fn new<I, B>(bands: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<String>,
    {
        Self {
            bands: bands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn bands(&self) -> &[String] {
        &self.bands
    }
}

impl Loader for AssetLoader {
    type Data = SceneStack;

    async fn load(
        &self,
        items: &ItemCollection,
        area: &TileGeometry,
    ) -> Result<SceneStack, StageError> {
        let bounds = split(area)?;

        let mut scenes: Vec<Scene> = items
            .iter()
            .map(|item| Scene::from_item(item, &self.bands))
            .collect();
        // Stable, so scenes without a datetime keep catalog order at the front
        scenes.sort_by_key(|scene| scene.datetime);

        debug!(scenes = scenes.len(), bounds = %bounds, "Resolved scene assets");
        Ok(SceneStack { scenes, bounds })
    }
}
