//! Batch orchestration for StoryReel.
//!
//! Composes the segmenter, the generation client, and the job registry:
//! a batch of segments becomes one generation job each, dispatched in
//! parallel or dependency order, with progress advanced either by a
//! simulated timeline or by polling the upstream operation.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod poller;
pub mod progress;
pub mod registry;
pub mod status;

pub use config::OrchestratorConfig;
pub use dispatch::Orchestrator;
pub use error::{OrchestratorError, OrchestratorResult};
pub use registry::JobRegistry;
