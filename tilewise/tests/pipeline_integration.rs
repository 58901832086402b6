//! End-to-end runs over grid tiles with an in-memory catalog.
//!
//! Covers the per-tile outcome taxonomy, the antimeridian merge as seen by
//! the loader, and the skip-on-existing-output behaviour of a resumed run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tilewise::catalog::{Asset, CatalogClient, CatalogError, CatalogItem, ItemCollection, SearchQuery};
use tilewise::coord::{BoundingBox, TileId};
use tilewise::geometry::TileGeometry;
use tilewise::grid::{GridDefinition, TileGrid};
use tilewise::naming::ItemPath;
use tilewise::pipeline::{
    AssetLoader, Loader, OutcomeKind, RunError, Runner, RunnerConfig, SceneStack, StacItemWriter,
    StageError, Task, TaskOutcome, TemporalSummaryProcessor, TileLog,
};
use tilewise::search::{RetryPolicy, StacSearcher};

const CROSSING: (i32, i32) = (66, 22);
const EMPTY: (i32, i32) = (0, 5);

/// Catalog answering from a fixed list by bbox overlap.
struct InMemoryCatalog {
    items: Vec<CatalogItem>,
    queries: AtomicUsize,
    fail: bool,
}

impl InMemoryCatalog {
    fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items,
            queries: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl CatalogClient for InMemoryCatalog {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogItem>, CatalogError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CatalogError::Http("503 Service Unavailable".to_string()));
        }
        let Some(query_bbox) = query.bbox else {
            return Ok(self.items.clone());
        };
        Ok(self
            .items
            .iter()
            .filter(|item| {
                item.bbox
                    .as_ref()
                    .and_then(|b| BoundingBox::new(b[0], b[1], b[2], b[3]).ok())
                    .is_some_and(|b| b.intersects(&query_bbox))
            })
            .cloned()
            .collect())
    }
}

/// Loader recording the item ids it was handed for each call.
struct RecordingLoader {
    inner: AssetLoader,
    seen: Mutex<Vec<Vec<String>>>,
}

impl Loader for RecordingLoader {
    type Data = SceneStack;

    async fn load(
        &self,
        items: &ItemCollection,
        area: &TileGeometry,
    ) -> Result<SceneStack, StageError> {
        let ids = items.iter().map(|item| item.id.clone()).collect();
        self.seen.lock().unwrap().push(ids);
        self.inner.load(items, area).await
    }
}

fn scene(id: &str, bbox: [f64; 4]) -> CatalogItem {
    let mut item = CatalogItem::new(id)
        .with_collection("landsat-c2-l2")
        .with_property("datetime", "2024-03-01T22:10:00Z")
        .with_asset("red", Asset::new(format!("https://data/{}/red.tif", id)));
    item.bbox = Some(bbox.to_vec());
    item
}

/// One scene east of 180°, one strip matching both halves of the crossing
/// tile, nothing near the empty tile.
fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        scene("east", [179.5, -16.5, 180.0, -16.2]),
        scene("strip", [-180.0, -16.5, 180.0, -16.2]),
    ])
}

fn tiles() -> Vec<(TileId, TileGeometry)> {
    let grid = TileGrid::new(GridDefinition::pacific());
    [EMPTY, CROSSING]
        .into_iter()
        .map(|(col, row)| {
            grid.tile(&TileId::grid(col, row), 30.0)
                .unwrap()
                .into_parts()
        })
        .collect()
}

type TestTask =
    Task<StacSearcher<Arc<InMemoryCatalog>>, RecordingLoader, TemporalSummaryProcessor, StacItemWriter>;

struct Harness {
    dir: TempDir,
    catalog: Arc<InMemoryCatalog>,
    loader: Arc<RecordingLoader>,
    task: TestTask,
}

impl Harness {
    fn new(catalog: InMemoryCatalog) -> Self {
        let dir = TempDir::new().unwrap();
        let catalog = Arc::new(catalog);
        let searcher = StacSearcher::new(Arc::clone(&catalog), vec!["landsat-c2-l2".to_string()])
            .with_datetime("2024")
            .with_retry_policy(RetryPolicy::none());
        let loader = Arc::new(RecordingLoader {
            inner: AssetLoader::new(["red"]),
            seen: Mutex::new(Vec::new()),
        });
        let writer = StacItemWriter::new(
            ItemPath::new("ls", "summary", "0.1.0", "2024")
                .with_root(dir.path().to_string_lossy().to_string()),
        );
        let task = Task::new(
            Arc::new(searcher),
            Arc::clone(&loader),
            Arc::new(TemporalSummaryProcessor::new(["red"])),
            Arc::new(writer),
        );
        Self {
            dir,
            catalog,
            loader,
            task,
        }
    }

    fn runner(&self, config: RunnerConfig) -> Runner<
        StacSearcher<Arc<InMemoryCatalog>>,
        RecordingLoader,
        TemporalSummaryProcessor,
        StacItemWriter,
    > {
        let log = TileLog::open(self.dir.path().join("logs").join("run_log.csv")).unwrap();
        Runner::new(self.task.clone(), config).with_log(log)
    }
}

#[tokio::test]
async fn test_empty_tile_skips_and_crossing_tile_completes() {
    let harness = Harness::new(catalog());
    let report = harness
        .runner(RunnerConfig::default())
        .run(tiles())
        .await
        .unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.complete(), 1);

    let empty = report.outcome(&TileId::grid(EMPTY.0, EMPTY.1)).unwrap();
    assert_eq!(empty.kind(), OutcomeKind::SkippedNoItems);

    // The crossing tile queried both halves and the loader saw each item once
    let seen = harness.loader.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![vec!["east".to_string(), "strip".to_string()]]);
    assert_eq!(harness.catalog.queries(), 3);

    let crossing = report
        .outcome(&TileId::grid(CROSSING.0, CROSSING.1))
        .unwrap();
    let TaskOutcome::Complete(paths) = crossing else {
        panic!("expected complete, got {:?}", crossing);
    };
    let document: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&paths[0]).unwrap()).unwrap();
    let bbox = document["bbox"].as_array().unwrap();
    assert!(bbox[0].as_f64().unwrap() > bbox[2].as_f64().unwrap());
    assert_eq!(document["properties"]["source_items"].as_array().unwrap().len(), 2);
    assert_eq!(document["id"], "dep_ls_summary_066_022_2024");
}

#[tokio::test]
async fn test_tile_log_records_each_outcome() {
    let harness = Harness::new(catalog());
    harness
        .runner(RunnerConfig::default())
        .run(tiles())
        .await
        .unwrap();

    let log = std::fs::read_to_string(harness.dir.path().join("logs").join("run_log.csv")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("\"0,5\",skipped:no-items,"));
    assert!(lines[2].starts_with("\"66,22\",complete,"));
}

#[tokio::test]
async fn test_second_run_skips_written_tiles() {
    let harness = Harness::new(catalog());
    harness
        .runner(RunnerConfig::default())
        .run(tiles())
        .await
        .unwrap();
    let queries_after_first = harness.catalog.queries();

    let report = harness
        .runner(RunnerConfig::default())
        .run(tiles())
        .await
        .unwrap();

    // Only the empty tile is searched again; the written tile short-circuits
    assert_eq!(harness.catalog.queries(), queries_after_first + 1);
    assert_eq!(harness.loader.seen.lock().unwrap().len(), 1);
    assert_eq!(report.complete(), 1);
    assert_eq!(report.skipped(), 1);
}

#[tokio::test]
async fn test_overwrite_redoes_written_tiles() {
    let harness = Harness::new(catalog());
    harness
        .runner(RunnerConfig::default())
        .run(tiles())
        .await
        .unwrap();

    let config = RunnerConfig {
        overwrite: true,
        ..Default::default()
    };
    harness.runner(config).run(tiles()).await.unwrap();

    assert_eq!(harness.loader.seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_catalog_failures_fail_tiles_but_not_the_run() {
    let harness = Harness::new(InMemoryCatalog::failing());
    let report = harness
        .runner(RunnerConfig::default())
        .run(tiles())
        .await
        .unwrap();

    assert_eq!(report.count(OutcomeKind::LoadError), 2);
    assert!(harness.loader.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fail_fast_stops_after_first_failure() {
    let harness = Harness::new(InMemoryCatalog::failing());
    let config = RunnerConfig {
        continue_on_error: false,
        ..Default::default()
    };

    let result = harness.runner(config).run(tiles()).await;
    match result {
        Err(RunError::Halted { tile_id, report, .. }) => {
            assert_eq!(tile_id, TileId::grid(EMPTY.0, EMPTY.1));
            assert_eq!(report.total(), 1);
        }
        other => panic!("expected halt, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_run_matches_sequential_outcomes() {
    let harness = Harness::new(catalog());
    let config = RunnerConfig {
        max_in_flight: 2,
        ..Default::default()
    };
    let report = harness.runner(config).run_concurrent(tiles()).await.unwrap();

    assert_eq!(report.skipped(), 1);
    assert_eq!(report.complete(), 1);
}
