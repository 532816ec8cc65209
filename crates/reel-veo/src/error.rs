//! Veo client error types and quota classification.

use thiserror::Error;

pub type VeoResult<T> = Result<T, VeoError>;

#[derive(Debug, Error)]
pub enum VeoError {
    #[error("VEO_API_KEY not set")]
    MissingApiKey,

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Poll failed: {0}")]
    Poll(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl VeoError {
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    pub fn poll(msg: impl Into<String>) -> Self {
        Self::Poll(msg.into())
    }

    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    /// Check if this error indicates upstream rate/resource exhaustion.
    pub fn is_quota(&self) -> bool {
        is_quota_error(&self.to_string())
    }
}

/// Classify an upstream error message as a quota/rate-limit failure.
///
/// The upstream error shape is not contractually guaranteed, so this is a
/// substring heuristic kept behind a single function. Swap it for a typed
/// check once the upstream API exposes one.
pub fn is_quota_error(message: &str) -> bool {
    message.contains("429") || message.contains("RESOURCE_EXHAUSTED")
}
