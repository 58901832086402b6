//! STAC item output.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{json, Value};
use tracing::debug;

use super::processor::TemporalSummary;
use crate::antimeridian::SearchBounds;
use crate::coord::{BoundingBox, TileId};
use crate::naming::ItemPath;
use crate::pipeline::{StageError, Writer};

pub const STAC_VERSION: &str = "1.0.0";

pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";

/// Writes one STAC item document per tile at [`ItemPath::stac_path`].
///
/// Asset hrefs point at where the raster outputs for each band belong;
/// producing those rasters is up to the caller's processor.
#[derive(Debug, Clone)]
pub struct StacItemWriter {
    item_path: ItemPath,
}

impl StacItemWriter {
    pub fn new(item_path: ItemPath) -> Self {
        Self { item_path }
    }

    pub fn item_path(&self) -> &ItemPath {
        &self.item_path
    }

    /// Builds the item document for a tile.
    pub fn item(&self, summary: &TemporalSummary, tile_id: &TileId) -> Value {
        let assets: serde_json::Map<String, Value> = summary
            .bands
            .iter()
            .map(|band| {
                let asset = json!({
                    "href": self.item_path.raster_path(tile_id, band),
                    "type": COG_MEDIA_TYPE,
                    "roles": ["data"],
                });
                (band.clone(), asset)
            })
            .collect();

        let mut properties = summary.properties.clone();
        properties.insert(
            "source_items".into(),
            summary
                .scenes
                .iter()
                .map(|scene| Value::from(scene.item_id.clone()))
                .collect(),
        );

        json!({
            "type": "Feature",
            "stac_version": STAC_VERSION,
            "id": self.item_path.basename(tile_id),
            "collection": self.item_path.item_prefix(),
            "bbox": bbox(&summary.bounds),
            "geometry": footprint(&summary.bounds),
            "properties": properties,
            "assets": assets,
            "links": [
                { "rel": "self", "href": self.item_path.stac_path(tile_id) }
            ],
        })
    }
}

/// STAC bbox: a crossing region is written west-to-east with `west > east`.
fn bbox(bounds: &SearchBounds) -> [f64; 4] {
    match bounds {
        SearchBounds::Single(b) => b.to_array(),
        SearchBounds::Split(left, right) => [
            left.min_x(),
            left.min_y().min(right.min_y()),
            right.max_x(),
            left.max_y().max(right.max_y()),
        ],
    }
}

fn ring(b: &BoundingBox) -> Value {
    json!([[
        [b.min_x(), b.min_y()],
        [b.max_x(), b.min_y()],
        [b.max_x(), b.max_y()],
        [b.min_x(), b.max_y()],
        [b.min_x(), b.min_y()],
    ]])
}

fn footprint(bounds: &SearchBounds) -> Value {
    match bounds {
        SearchBounds::Single(b) => json!({ "type": "Polygon", "coordinates": ring(b) }),
        SearchBounds::Split(left, right) => json!({
            "type": "MultiPolygon",
            "coordinates": [ring(left), ring(right)],
        }),
    }
}

impl Writer for StacItemWriter {
    type Data = TemporalSummary;

    fn write(&self, data: TemporalSummary, tile_id: &TileId) -> Result<Vec<String>, StageError> {
        let path = self.item_path.stac_path(tile_id);
        let document = serde_json::to_vec_pretty(&self.item(&data, tile_id))
            .map_err(|e| StageError::Serialization(e.to_string()))?;

        if let Some(parent) = Path::new(&path).parent() {
            fs::create_dir_all(parent).map_err(|e| StageError::io(&path, e))?;
        }
        fs::write(&path, document).map_err(|e| StageError::io(&path, e))?;

        debug!(path = %path, scenes = data.scenes.len(), "Wrote STAC item");
        Ok(vec![path])
    }

    fn already_written(&self, tile_id: &TileId) -> Result<bool, StageError> {
        let path = self.item_path.stac_path(tile_id);
        match fs::metadata(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StageError::io(path, e)),
        }
    }

    fn output_paths(&self, tile_id: &TileId) -> Vec<String> {
        vec![self.item_path.stac_path(tile_id)]
    }
}
