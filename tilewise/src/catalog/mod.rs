//! Catalog items and catalog clients.
//!
//! Scenes are discovered through a STAC-style catalog. This module holds the
//! item model ([`CatalogItem`], [`ItemCollection`]), the query contract
//! ([`CatalogClient`], [`SearchQuery`]) and an HTTP implementation
//! ([`StacApiClient`]) over an injectable [`AsyncHttpClient`].

mod client;
mod http;
mod item;
mod stac_api;

pub use client::{CatalogClient, SearchQuery};
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use item::{Asset, CatalogItem, ItemCollection};
pub use stac_api::{StacApiClient, DEFAULT_PAGE_SIZE};

#[cfg(test)]
pub use client::mock::MockCatalogClient;
#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

use thiserror::Error;

/// Errors that can occur while querying a catalog.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// Transport failure or non-success status
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Query could not be built
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
