//! Per-tile Search → Load → Process → Write pipeline.
//!
//! # Architecture
//!
//! ```text
//! (TileId, TileGeometry)
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │  Task               │  already written? → Complete(existing paths)
//! │   Searcher::search  │  EmptyCollection  → Skipped
//! │   Loader::load      │  error            → Failed(Load)
//! │   Processor::process│  None             → Failed(NoOutput)
//! │   Writer::write     │  error            → Failed(Write)
//! └─────────────────────┘
//!        │ TaskOutcome
//!        ▼
//! ┌─────────────────────┐
//! │  Runner             │  RunReport + TileLog
//! └─────────────────────┘
//! ```
//!
//! The runner keeps going after failed tiles unless configured otherwise,
//! except for unsupported footprints, which always stop the run.

pub mod adapters;
mod error;
mod log;
mod outcome;
mod runner;
mod task;
mod traits;

pub use adapters::{
    AssetLoader, Scene, SceneStack, StacItemWriter, TemporalSummary, TemporalSummaryProcessor,
};
pub use error::{RunError, StageError, TaskError};
pub use log::TileLog;
pub use outcome::{OutcomeKind, RunReport, TaskOutcome};
pub use runner::{Runner, RunnerConfig, DEFAULT_MAX_IN_FLIGHT};
pub use task::Task;
pub use traits::{Loader, Processor, Writer};
