//! STAC API item search over HTTP.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::http::{AsyncHttpClient, AsyncReqwestClient};
use super::{CatalogClient, CatalogError, CatalogItem, SearchQuery};

/// Items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Guards against servers whose `next` link never ends.
const MAX_PAGES: usize = 10_000;

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    features: Vec<CatalogItem>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    rel: String,
    href: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    merge: bool,
}

enum PageRequest {
    Get(String),
    Post(String, Value),
}

/// Client for a STAC API `/search` endpoint.
///
/// Searches are POSTed; `next` links are followed (GET or POST, as the
/// server says) until the results run out or `max_items` is reached.
pub struct StacApiClient<H = AsyncReqwestClient> {
    http: H,
    root: String,
    page_size: u32,
}

impl StacApiClient<AsyncReqwestClient> {
    /// Creates a client for the API rooted at `root`.
    pub fn new(root: impl Into<String>, timeout_secs: u64) -> Result<Self, CatalogError> {
        Ok(Self::with_http_client(
            root,
            AsyncReqwestClient::with_timeout(timeout_secs)?,
        ))
    }
}

impl<H: AsyncHttpClient> StacApiClient<H> {
    pub fn with_http_client(root: impl Into<String>, http: H) -> Self {
        Self {
            http,
            root: root.into().trim_end_matches('/').to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.root)
    }

    async fn fetch(&self, request: &PageRequest) -> Result<SearchPage, CatalogError> {
        let bytes = match request {
            PageRequest::Get(url) => self.http.get(url).await?,
            PageRequest::Post(url, body) => self.http.post_json(url, &body.to_string()).await?,
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::InvalidResponse(format!("search page: {}", e)))
    }
}

/// Works out the request for the page after `current`.
fn next_request(links: &[Link], current: &PageRequest) -> Option<PageRequest> {
    let link = links.iter().find(|l| l.rel == "next")?;
    let is_post = link
        .method
        .as_deref()
        .map(|m| m.eq_ignore_ascii_case("POST"))
        .unwrap_or(false);
    if !is_post {
        return Some(PageRequest::Get(link.href.clone()));
    }

    let previous = match current {
        PageRequest::Post(_, body) => body.clone(),
        PageRequest::Get(_) => Value::Object(Map::new()),
    };
    let body = match (&link.body, link.merge) {
        (Some(Value::Object(extra)), true) => {
            let mut merged = match previous {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            for (k, v) in extra {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        (Some(body), _) => body.clone(),
        (None, _) => previous,
    };
    Some(PageRequest::Post(link.href.clone(), body))
}

impl<H: AsyncHttpClient> CatalogClient for StacApiClient<H> {
    #[instrument(skip(self, query), fields(collections = ?query.collections, bbox = ?query.bbox.map(|b| b.to_array())))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogItem>, CatalogError> {
        let mut request = PageRequest::Post(self.search_url(), query.to_request_body(self.page_size));
        let mut items = Vec::new();

        for page_number in 1..=MAX_PAGES {
            let page = self.fetch(&request).await?;
            let received = page.features.len();
            items.extend(page.features);
            debug!(page = page_number, received, total = items.len(), "Fetched search page");

            if let Some(max) = query.max_items {
                if items.len() >= max {
                    items.truncate(max);
                    break;
                }
            }
            if received == 0 {
                break;
            }
            match next_request(&page.links, &request) {
                Some(next) => request = next,
                None => break,
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockAsyncHttpClient;
    use crate::coord::BoundingBox;
    use serde_json::json;

    fn page(ids: &[&str], next: Option<Value>) -> Result<Vec<u8>, CatalogError> {
        let features: Vec<Value> = ids
            .iter()
            .map(|id| json!({"type": "Feature", "id": id, "properties": {}, "assets": {}}))
            .collect();
        let links: Vec<Value> = next.into_iter().collect();
        Ok(json!({"type": "FeatureCollection", "features": features, "links": links})
            .to_string()
            .into_bytes())
    }

    fn query() -> SearchQuery {
        SearchQuery::new(vec!["landsat-c2-l2".to_string()])
            .with_bbox(BoundingBox::new(179.0, -1.0, 180.0, 1.0).unwrap())
    }

    #[tokio::test]
    async fn test_single_page_search_posts_query() {
        let http = MockAsyncHttpClient::new(vec![page(&["a", "b"], None)]);
        let client = StacApiClient::with_http_client("https://stac.example.com/", http);

        let items = client.search(&query()).await.unwrap();
        assert_eq!(items.len(), 2);

        let requests = client.http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "https://stac.example.com/search");
        let body: Value = serde_json::from_str(requests[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["bbox"], json!([179.0, -1.0, 180.0, 1.0]));
        assert_eq!(body["collections"], json!(["landsat-c2-l2"]));
    }

    #[tokio::test]
    async fn test_follows_get_next_links() {
        let http = MockAsyncHttpClient::new(vec![
            page(&["a"], Some(json!({"rel": "next", "href": "https://stac.example.com/search?page=2"}))),
            page(&["b"], None),
        ]);
        let client = StacApiClient::with_http_client("https://stac.example.com", http);

        let items = client.search(&query()).await.unwrap();
        assert_eq!(items.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);

        let requests = client.http.requests();
        assert_eq!(requests[1].method, "GET");
        assert_eq!(requests[1].url, "https://stac.example.com/search?page=2");
    }

    #[tokio::test]
    async fn test_follows_post_next_links_with_merge() {
        let http = MockAsyncHttpClient::new(vec![
            page(
                &["a"],
                Some(json!({
                    "rel": "next",
                    "href": "https://stac.example.com/search",
                    "method": "POST",
                    "body": {"token": "page2"},
                    "merge": true
                })),
            ),
            page(&["b"], None),
        ]);
        let client = StacApiClient::with_http_client("https://stac.example.com", http);
        client.search(&query()).await.unwrap();

        let requests = client.http.requests();
        let body: Value = serde_json::from_str(requests[1].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["token"], json!("page2"));
        assert_eq!(body["collections"], json!(["landsat-c2-l2"]));
    }

    #[tokio::test]
    async fn test_max_items_stops_paging() {
        let http = MockAsyncHttpClient::new(vec![page(
            &["a", "b", "c"],
            Some(json!({"rel": "next", "href": "https://stac.example.com/next"})),
        )]);
        let client = StacApiClient::with_http_client("https://stac.example.com", http);

        let items = client.search(&query().with_max_items(2)).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(client.http.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_body_is_reported() {
        let http = MockAsyncHttpClient::new(vec![Ok(b"<html>".to_vec())]);
        let client = StacApiClient::with_http_client("https://stac.example.com", http);
        assert!(matches!(
            client.search(&query()).await,
            Err(CatalogError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_http_errors_propagate() {
        let http = MockAsyncHttpClient::new(vec![Err(CatalogError::Http("HTTP 503".to_string()))]);
        let client = StacApiClient::with_http_client("https://stac.example.com", http);
        assert!(matches!(
            client.search(&query()).await,
            Err(CatalogError::Http(_))
        ));
    }
}
