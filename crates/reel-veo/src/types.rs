//! Boundary types returned by the generation client.

use serde::{Deserialize, Serialize};

/// Result of a successful job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Upstream identifier for the submission
    pub id: String,
    /// Opaque handle to the long-running operation, when the upstream
    /// returned one; absent handles mean progress must be simulated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Thumbnail URI, when available at submission time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_uri: Option<String>,
}

/// Snapshot of a long-running operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationStatus {
    /// Whether the upstream reports the operation finished. Only this
    /// flag may signal completion; elapsed-time estimates never do.
    pub done: bool,
    /// Artifact URI when the operation finished with a result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_uri: Option<String>,
    /// Thumbnail URI when the upstream produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_uri: Option<String>,
}

impl OperationStatus {
    /// Status for an operation that is still running.
    pub fn pending() -> Self {
        Self {
            done: false,
            result_uri: None,
            thumbnail_uri: None,
        }
    }
}
