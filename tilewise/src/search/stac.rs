//! Generic STAC searcher.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::antimeridian::{split, SearchBounds};
use crate::catalog::{CatalogClient, CatalogItem, ItemCollection, SearchQuery};
use crate::coord::{BoundingBox, TileId};
use crate::geometry::TileGeometry;

use super::sanitize::{fix_bad_epsgs, remove_bad_items, DENIED_ITEM_IDS};
use super::{RetryPolicy, SearchError, Searcher};

/// Searches a catalog for the items covering a tile.
///
/// Footprints crossing the antimeridian are searched as two boxes and the
/// results merged, west half first, keeping the first copy of each id.
pub struct StacSearcher<C> {
    client: C,
    collections: Vec<String>,
    datetime: Option<String>,
    filters: Map<String, Value>,
    max_items: Option<usize>,
    retry: RetryPolicy,
    suppress_empty: bool,
    denied_ids: HashSet<String>,
}

impl<C: CatalogClient> StacSearcher<C> {
    pub fn new(client: C, collections: Vec<String>) -> Self {
        Self {
            client,
            collections,
            datetime: None,
            filters: Map::new(),
            max_items: None,
            retry: RetryPolicy::default(),
            suppress_empty: false,
            denied_ids: DENIED_ITEM_IDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Restricts results to an RFC 3339 instant, interval or year range.
    pub fn with_datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }

    /// Adds a STAC query-extension filter, e.g. `("eo:cloud_cover", "lt", 50)`.
    pub fn with_filter(mut self, key: &str, op: &str, value: impl Into<Value>) -> Self {
        let query = SearchQuery::default().with_filter(key, op, value);
        for (k, v) in query.filters {
            merge_filter(&mut self.filters, k, v);
        }
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Return an empty collection instead of [`SearchError::EmptyCollection`].
    pub fn with_suppress_empty(mut self, suppress: bool) -> Self {
        self.suppress_empty = suppress;
        self
    }

    /// Adds ids to drop from every result.
    pub fn with_denied_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.denied_ids.extend(ids);
        self
    }

    #[inline]
    pub fn client_ref(&self) -> &C {
        &self.client
    }

    #[inline]
    pub fn filters(&self) -> &Map<String, Value> {
        &self.filters
    }

    #[inline]
    pub fn suppresses_empty(&self) -> bool {
        self.suppress_empty
    }

    fn query_for(&self, bbox: BoundingBox, filters: &Map<String, Value>) -> SearchQuery {
        let mut query = SearchQuery::new(self.collections.clone()).with_bbox(bbox);
        query.datetime = self.datetime.clone();
        query.filters = filters.clone();
        query.max_items = self.max_items;
        query
    }

    async fn query_with_retry(&self, query: &SearchQuery) -> Result<Vec<CatalogItem>, SearchError> {
        self.retry
            .run("catalog search", || self.client.search(query))
            .await
            .map_err(|source| SearchError::Catalog {
                attempts: self.retry.max_attempts,
                source,
            })
    }

    /// Queries every box, merges, repairs and filters, without the empty
    /// check.
    pub(crate) async fn collect(
        &self,
        bounds: &SearchBounds,
        filters: &Map<String, Value>,
    ) -> Result<ItemCollection, SearchError> {
        let mut items = ItemCollection::new();
        for bbox in bounds.boxes() {
            let found = self.query_with_retry(&self.query_for(bbox, filters)).await?;
            debug!(bbox = %bbox, found = found.len(), "Catalog query complete");
            items.extend(found);
        }

        fix_bad_epsgs(&mut items);
        remove_bad_items(&mut items, &self.denied_ids);
        Ok(items)
    }

    /// Searches explicit bounds with explicit filters.
    pub async fn search_bounds(
        &self,
        bounds: &SearchBounds,
        filters: &Map<String, Value>,
    ) -> Result<ItemCollection, SearchError> {
        let items = self.collect(bounds, filters).await?;
        self.check_empty(items)
    }

    pub(crate) fn check_empty(&self, items: ItemCollection) -> Result<ItemCollection, SearchError> {
        if items.is_empty() && !self.suppress_empty {
            return Err(SearchError::EmptyCollection);
        }
        Ok(items)
    }
}

/// Merges `{op: value}` objects for the same property key.
pub(crate) fn merge_filter(filters: &mut Map<String, Value>, key: String, ops: Value) {
    match (filters.get_mut(&key), ops) {
        (Some(Value::Object(existing)), Value::Object(new_ops)) => {
            existing.extend(new_ops);
        }
        (_, ops) => {
            filters.insert(key, ops);
        }
    }
}

impl<C: CatalogClient> Searcher for StacSearcher<C> {
    #[instrument(skip(self, area), fields(tile = %tile_id))]
    async fn search(
        &self,
        tile_id: &TileId,
        area: &TileGeometry,
    ) -> Result<ItemCollection, SearchError> {
        let bounds = split(area)?;
        debug!(bounds = %bounds, split = bounds.is_split(), "Searching tile");
        self.search_bounds(&bounds, &self.filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, MockCatalogClient};
    use std::time::Duration;

    fn item(id: &str, bbox: [f64; 4]) -> CatalogItem {
        let mut item = CatalogItem::new(id).with_collection("landsat-c2-l2");
        item.bbox = Some(bbox.to_vec());
        item
    }

    fn crossing_tile() -> TileGeometry {
        TileGeometry::geographic(
            geo::Rect::new(
                geo::coord! { x: 179.0, y: -1.0 },
                geo::coord! { x: 181.0, y: 1.0 },
            )
            .to_polygon(),
        )
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_crossing_tile_queries_both_sides_and_dedups() {
        let client = MockCatalogClient::new(vec![
            item("west", [178.5, -1.0, 179.5, 1.0]),
            item("straddler", [-180.0, -1.0, 180.0, 1.0]),
            item("east", [-179.5, -1.0, -178.5, 1.0]),
            item("far", [10.0, -1.0, 11.0, 1.0]),
        ]);
        let searcher = StacSearcher::new(client, vec!["landsat-c2-l2".to_string()]);

        let items = searcher.search(&TileId::grid(66, 22), &crossing_tile()).await.unwrap();
        assert_eq!(items.ids(), vec!["west", "straddler", "east"]);

        let queries = searcher.client.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].bbox.unwrap().to_array(), [179.0, -1.0, 180.0, 1.0]);
        assert_eq!(queries[1].bbox.unwrap().to_array(), [-180.0, -1.0, -179.0, 1.0]);
    }

    #[tokio::test]
    async fn test_empty_result_is_error_unless_suppressed() {
        let tile = crossing_tile();
        let searcher = StacSearcher::new(MockCatalogClient::new(vec![]), vec![]);
        let result = searcher.search(&TileId::grid(0, 0), &tile).await;
        assert!(matches!(result, Err(SearchError::EmptyCollection)));

        let searcher =
            StacSearcher::new(MockCatalogClient::new(vec![]), vec![]).with_suppress_empty(true);
        let items = searcher.search(&TileId::grid(0, 0), &tile).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_denied_items_are_removed_before_empty_check() {
        let client = MockCatalogClient::new(vec![item(
            "LC08_L2SR_081074_20220514_02_T1",
            [179.0, -1.0, 180.0, 1.0],
        )]);
        let searcher = StacSearcher::new(client, vec![]);
        let result = searcher.search(&TileId::grid(0, 0), &crossing_tile()).await;
        assert!(matches!(result, Err(SearchError::EmptyCollection)));
    }

    #[tokio::test]
    async fn test_epsg_codes_are_repaired() {
        let client = MockCatalogClient::new(vec![
            item("a", [179.0, -1.0, 180.0, 1.0]).with_property("proj:epsg", 3261)
        ]);
        let searcher = StacSearcher::new(client, vec![]);
        let items = searcher.search(&TileId::grid(0, 0), &crossing_tile()).await.unwrap();
        assert_eq!(items.get("a").unwrap().epsg(), Some(32601));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let client = MockCatalogClient::new(vec![item("a", [179.0, -1.0, 180.0, 1.0])])
            .failing_first(2);
        let searcher = StacSearcher::new(client, vec![]).with_retry_policy(fast_retry());

        let items = searcher.search(&TileId::grid(0, 0), &crossing_tile()).await.unwrap();
        assert_eq!(items.ids(), vec!["a"]);
        // Two failures then one success per side
        assert_eq!(searcher.client.queries().len(), 4);
    }

    #[tokio::test]
    async fn test_persistent_failure_reports_attempts() {
        let client = MockCatalogClient::new(vec![]).failing_first(100);
        let searcher = StacSearcher::new(client, vec![]).with_retry_policy(fast_retry());

        let result = searcher.search(&TileId::grid(0, 0), &crossing_tile()).await;
        match result {
            Err(SearchError::Catalog { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(source, CatalogError::Http(_)));
            }
            other => panic!("expected catalog error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_filters_and_datetime_reach_the_query() {
        let searcher = StacSearcher::new(MockCatalogClient::new(vec![]), vec!["s2".to_string()])
            .with_datetime("2023")
            .with_filter("eo:cloud_cover", "lt", 50)
            .with_filter("eo:cloud_cover", "gte", 0)
            .with_suppress_empty(true);
        let bounds = SearchBounds::Single(BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap());
        searcher.search_bounds(&bounds, searcher.filters()).await.unwrap();

        let query = &searcher.client.queries()[0];
        assert_eq!(query.collections, vec!["s2".to_string()]);
        assert_eq!(query.datetime.as_deref(), Some("2023"));
        assert_eq!(
            query.filters["eo:cloud_cover"],
            serde_json::json!({"lt": 50, "gte": 0})
        );
    }

    #[tokio::test]
    async fn test_unsupported_geometry_is_a_geometry_error() {
        let searcher = StacSearcher::new(MockCatalogClient::new(vec![]), vec![]);
        let point = TileGeometry::geographic(geo::point!(x: 0.0, y: 0.0));
        assert!(matches!(
            searcher.search(&TileId::grid(0, 0), &point).await,
            Err(SearchError::Geometry(_))
        ));
    }
}
