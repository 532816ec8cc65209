//! Orchestrator error types.

use reel_models::{JobId, JobState};
use thiserror::Error;

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Unknown job: {0}")]
    NotFound(JobId),

    #[error("Job {id} is not ready for download (state: {state})")]
    NotReady { id: JobId, state: JobState },

    #[error("Script error: {0}")]
    Script(#[from] reel_script::ScriptError),

    #[error("Generation service error: {0}")]
    Veo(#[from] reel_veo::VeoError),
}
