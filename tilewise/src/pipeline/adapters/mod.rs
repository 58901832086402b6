//! Reference stage implementations.
//!
//! These connect the pipeline's stage traits to the catalog model and the
//! naming scheme without touching pixels. Raster reading and encoding stay
//! outside the crate; a deployment swaps in its own [`Loader`] and
//! [`Processor`] and keeps the rest.
//!
//! - [`AssetLoader`] - Resolves requested band hrefs into a [`SceneStack`]
//! - [`TemporalSummaryProcessor`] - Summarizes a stack over its time range
//! - [`StacItemWriter`] - Writes one STAC item document per tile
//!
//! [`Loader`]: super::Loader
//! [`Processor`]: super::Processor

mod loader;
mod processor;
mod writer;

pub use loader::{AssetLoader, Scene, SceneStack};
pub use processor::{TemporalSummary, TemporalSummaryProcessor};
pub use writer::{StacItemWriter, COG_MEDIA_TYPE, STAC_VERSION};
