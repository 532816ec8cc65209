//! Boundary to the external video-generation service.
//!
//! The upstream is a long-running-operation API: a submission returns an
//! opaque operation handle which is polled until `done`. This crate owns
//! the calling discipline (request shape, error classification, artifact
//! download with a placeholder fallback); everything above it treats the
//! service through the [`GenerationClient`] trait.

pub mod client;
pub mod error;
pub mod placeholder;
pub mod types;

pub use client::{GenerationClient, VeoClient, VeoClientConfig};
pub use error::{is_quota_error, VeoError, VeoResult};
pub use placeholder::placeholder_video;
pub use types::{OperationStatus, SubmitResponse};
