//! Dispatch options, per-batch results, and status views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::{Job, JobErrorKind, JobId, JobState, Quality};

/// Dispatch discipline for a batch of segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// All jobs submitted independently, no ordering dependency
    #[default]
    Parallel,
    /// Job i+1 submitted only after job i reaches a terminal state
    Sequential,
}

impl DispatchMode {
    pub fn is_sequential(&self) -> bool {
        matches!(self, DispatchMode::Sequential)
    }
}

/// Options for one orchestration call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchOptions {
    /// Quality tier for every job in the batch
    #[serde(default)]
    pub quality: Quality,

    /// Parallel or sequential dispatch
    #[serde(default)]
    pub mode: DispatchMode,

    /// Drive progress from the simulated timeline instead of upstream polls
    #[serde(default)]
    pub simulate: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            quality: Quality::Standard,
            mode: DispatchMode::Parallel,
            simulate: false,
        }
    }
}

/// Per-segment outcome of a dispatch call.
///
/// A batch always contains exactly one outcome per input segment, in
/// input order, regardless of how many submissions fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SegmentOutcome {
    /// The upstream accepted the job; it is tracked in the registry.
    Submitted {
        job_id: JobId,
        segment_index: usize,
        estimated_secs: f64,
        sequence_position: usize,
    },
    /// Submission failed; the error is contained to this slot.
    Failed {
        segment_index: usize,
        message: String,
        estimated_secs: f64,
        quota_exceeded: bool,
    },
}

impl SegmentOutcome {
    /// Index of the segment this outcome belongs to.
    pub fn segment_index(&self) -> usize {
        match self {
            SegmentOutcome::Submitted { segment_index, .. } => *segment_index,
            SegmentOutcome::Failed { segment_index, .. } => *segment_index,
        }
    }

    /// Estimated generation time requested for this segment.
    pub fn estimated_secs(&self) -> f64 {
        match self {
            SegmentOutcome::Submitted { estimated_secs, .. } => *estimated_secs,
            SegmentOutcome::Failed { estimated_secs, .. } => *estimated_secs,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SegmentOutcome::Failed { .. })
    }

    /// Job ID when the submission succeeded.
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            SegmentOutcome::Submitted { job_id, .. } => Some(job_id),
            SegmentOutcome::Failed { .. } => None,
        }
    }
}

/// Result of one orchestration call; built once, never mutated after
/// return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// One outcome per input segment, in input order
    pub outcomes: Vec<SegmentOutcome>,

    /// Sum of every job's estimated generation time
    pub total_estimated_secs: f64,

    /// Whether the batch was dispatched sequentially
    pub sequential: bool,
}

impl BatchResult {
    /// Build a batch result from per-segment outcomes.
    pub fn new(outcomes: Vec<SegmentOutcome>, sequential: bool) -> Self {
        let total_estimated_secs = outcomes.iter().map(|o| o.estimated_secs()).sum();
        Self {
            outcomes,
            total_estimated_secs,
            sequential,
        }
    }

    /// Number of submissions that failed.
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }
}

/// Lifecycle status exposed to callers, including the not-found case.
///
/// A status query is a query, not a command: an unknown job ID produces
/// a `NotFound` view rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Queued,
    Processing,
    Completed,
    Error,
    NotFound,
}

impl From<JobState> for StatusKind {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Queued => StatusKind::Queued,
            JobState::Processing => StatusKind::Processing,
            JobState::Completed => StatusKind::Completed,
            JobState::Error => StatusKind::Error,
        }
    }
}

/// Snapshot of a job's status returned by `get_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusView {
    pub job_id: JobId,
    pub status: StatusKind,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<JobErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl JobStatusView {
    /// Build a view from a registry snapshot.
    pub fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.state.into(),
            progress: job.progress,
            current_step: job.current_step.clone(),
            download_uri: job.download_uri.clone(),
            started_at: Some(job.started_at),
            estimated_completion: Some(job.estimated_completion),
            error_kind: job.error_kind,
            error_message: job.error_message.clone(),
        }
    }

    /// View for an unknown job ID.
    pub fn not_found(job_id: JobId) -> Self {
        Self {
            job_id,
            status: StatusKind::NotFound,
            progress: 0,
            current_step: None,
            download_uri: None,
            started_at: None,
            estimated_completion: None,
            error_kind: None,
            error_message: None,
        }
    }
}
