//! Catalog query contract.

use std::future::Future;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::coord::BoundingBox;

use super::{CatalogError, CatalogItem};

/// A single catalog search request.
///
/// `filters` uses the STAC query extension shape, e.g.
/// `{"landsat:collection_category": {"eq": "T1"}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub collections: Vec<String>,
    pub bbox: Option<BoundingBox>,
    pub datetime: Option<String>,
    pub filters: Map<String, Value>,
    /// Upper bound on items returned across all pages
    pub max_items: Option<usize>,
}

impl SearchQuery {
    pub fn new(collections: Vec<String>) -> Self {
        Self {
            collections,
            ..Self::default()
        }
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }

    /// Adds `{key: {op: value}}` to the property filters, merging with any
    /// existing operators on the same key.
    pub fn with_filter(mut self, key: &str, op: &str, value: impl Into<Value>) -> Self {
        let entry = self
            .filters
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(ops) = entry {
            ops.insert(op.to_string(), value.into());
        }
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// JSON body for a STAC API `POST /search`.
    pub fn to_request_body(&self, page_size: u32) -> Value {
        let mut body = Map::new();
        if !self.collections.is_empty() {
            body.insert("collections".to_string(), json!(self.collections));
        }
        if let Some(bbox) = &self.bbox {
            body.insert("bbox".to_string(), json!(bbox.to_array()));
        }
        if let Some(datetime) = &self.datetime {
            body.insert("datetime".to_string(), json!(datetime));
        }
        if !self.filters.is_empty() {
            body.insert("query".to_string(), Value::Object(self.filters.clone()));
        }
        let limit = match self.max_items {
            Some(max) => u32::try_from(max).unwrap_or(u32::MAX).min(page_size).max(1),
            None => page_size,
        };
        body.insert("limit".to_string(), json!(limit));
        Value::Object(body)
    }
}

/// Trait for catalogs that answer item searches.
///
/// Implementations return every matching item; pagination is their concern.
pub trait CatalogClient: Send + Sync {
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<CatalogItem>, CatalogError>> + Send;
}

impl<C: CatalogClient> CatalogClient for Arc<C> {
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<CatalogItem>, CatalogError>> + Send {
        self.as_ref().search(query)
    }
}
