//! Transport used by the STAC client.
//!
//! Kept behind a trait so catalog paging can be tested without a network.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::CatalogError;

/// Byte-level HTTP transport for catalog requests.
pub trait AsyncHttpClient: Send + Sync {
    /// GET `url`, returning the body of a 2xx response.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, CatalogError>> + Send;

    /// POST a JSON document to `url`, returning the body of a 2xx response.
    fn post_json(
        &self,
        url: &str,
        json_body: &str,
    ) -> impl Future<Output = Result<Vec<u8>, CatalogError>> + Send;
}

const DEFAULT_USER_AGENT: &str = concat!("tilewise/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed transport with pooled connections.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the given request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read_response(
        response: reqwest::Response,
        method: &str,
        url: &str,
    ) -> Result<Vec<u8>, CatalogError> {
        if !response.status().is_success() {
            warn!(
                url = url,
                method = method,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(CatalogError::Http(format!(
                "HTTP {} from {} {}",
                response.status(),
                method,
                url
            )));
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(CatalogError::Http(format!("Failed to read response: {}", e)))
            }
        }
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(CatalogError::Http(format!("Request failed: {}", e)));
            }
        };

        Self::read_response(response, "GET", url).await
    }

    async fn post_json(&self, url: &str, json_body: &str) -> Result<Vec<u8>, CatalogError> {
        trace!(url = url, "HTTP POST request starting");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(json_body.to_string())
            .send()
            .await
            .map_err(|e| {
                warn!(url = url, error = %e, is_timeout = e.is_timeout(), "HTTP POST failed");
                CatalogError::Http(format!("POST request failed: {}", e))
            })?;

        Self::read_response(response, "POST", url).await
    }
}
