//! Generation job definitions and lifecycle states.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job created but not yet accepted by the upstream service
    #[default]
    Queued,
    /// Upstream accepted the job; generation in flight
    Processing,
    /// Generation finished and an artifact is available
    Completed,
    /// Job failed; see `error_kind`/`error_message`
    Error,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Error => "error",
        }
    }

    /// Terminal states are final; no further mutation is permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generation quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    Standard,
    High,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Standard => "standard",
            Quality::High => "high",
        }
    }

    /// Multiplier applied to the base generation-time estimate.
    pub fn time_multiplier(&self) -> f64 {
        match self {
            Quality::Standard => 1.0,
            Quality::High => 1.5,
        }
    }
}

/// Why a job ended in the `Error` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobErrorKind {
    /// Upstream rejected the submission due to rate/resource limits
    QuotaExceeded,
    /// Upstream rejected the submission for any other reason
    TransientUpstream,
    /// The polling call itself failed
    PollFailed,
    /// Upstream reported completion but produced no artifact
    NoResult,
    /// The job never reached a terminal state within the deadline
    Timeout,
}

impl JobErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobErrorKind::QuotaExceeded => "quota_exceeded",
            JobErrorKind::TransientUpstream => "transient_upstream",
            JobErrorKind::PollFailed => "poll_failed",
            JobErrorKind::NoResult => "no_result",
            JobErrorKind::Timeout => "timeout",
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, JobErrorKind::QuotaExceeded)
    }
}

/// One external video-generation request tracked through its lifecycle.
///
/// Owned exclusively by the job registry; progress drivers mutate it only
/// through the registry's guarded update methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Index of the narration segment this job renders
    pub segment_index: usize,

    /// Current lifecycle state
    #[serde(default)]
    pub state: JobState,

    /// Progress percentage (0-100)
    #[serde(default)]
    pub progress: u8,

    /// Human-readable label for the current generation step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,

    /// Submission timestamp
    pub started_at: DateTime<Utc>,

    /// Estimated completion timestamp (started_at + estimate)
    pub estimated_completion: DateTime<Utc>,

    /// Estimated generation time in seconds
    pub estimated_secs: f64,

    /// Requested quality tier
    pub quality: Quality,

    /// True when this job is part of a dependency-ordered chain
    pub sequential: bool,

    /// Position within the dispatch (1-based)
    pub sequence_position: usize,

    /// Total number of jobs in the dispatch
    pub total_in_sequence: usize,

    /// Opaque upstream operation handle, when the upstream returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    /// Artifact URI once the job completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_uri: Option<String>,

    /// Thumbnail URI, when the upstream produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_uri: Option<String>,

    /// Error classification (terminal `Error` state only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<JobErrorKind>,

    /// Human-readable error message (terminal `Error` state only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Job {
    /// Create a new job in the `Queued` state.
    pub fn new(
        segment_index: usize,
        quality: Quality,
        estimated_secs: f64,
        sequential: bool,
        sequence_position: usize,
        total_in_sequence: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            segment_index,
            state: JobState::Queued,
            progress: 0,
            current_step: None,
            started_at: now,
            estimated_completion: now + Duration::milliseconds((estimated_secs * 1000.0) as i64),
            estimated_secs,
            quality,
            sequential,
            sequence_position,
            total_in_sequence,
            operation_name: None,
            download_uri: None,
            thumbnail_uri: None,
            error_kind: None,
            error_message: None,
        }
    }

    /// Mark the job as accepted by the upstream service.
    pub fn start(&mut self, operation_name: Option<String>, thumbnail_uri: Option<String>) {
        self.state = JobState::Processing;
        self.operation_name = operation_name;
        self.thumbnail_uri = thumbnail_uri;
    }

    /// Apply a progress step, unless the job already reached a terminal
    /// state or the step would move progress backwards.
    ///
    /// Returns `true` if the step was applied. Stale timers firing after
    /// completion are silently ignored through this guard.
    pub fn apply_step(&mut self, progress: u8, label: Option<&str>) -> bool {
        if self.state.is_terminal() || progress < self.progress {
            return false;
        }
        self.progress = progress.min(100);
        if let Some(label) = label {
            self.current_step = Some(label.to_string());
        }
        if self.progress == 100 {
            self.state = JobState::Completed;
        }
        true
    }

    /// Mark the job as completed with an artifact URI.
    pub fn complete(&mut self, download_uri: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }
        self.state = JobState::Completed;
        self.progress = 100;
        self.current_step = Some("completed".into());
        self.download_uri = Some(download_uri.into());
    }

    /// Mark the job as failed.
    pub fn fail(&mut self, kind: JobErrorKind, message: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }
        self.state = JobState::Error;
        self.error_kind = Some(kind);
        self.error_message = Some(message.into());
    }

    /// Check if the job reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
