//! Shared data models for the StoryReel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Narration segments produced by the script segmenter
//! - Generation jobs and their lifecycle states
//! - Dispatch options and per-batch results
//! - Status views consumed by polling callers

pub mod batch;
pub mod job;
pub mod segment;

// Re-export common types
pub use batch::{BatchResult, DispatchMode, DispatchOptions, SegmentOutcome, StatusKind, JobStatusView};
pub use job::{Job, JobErrorKind, JobId, JobState, Quality};
pub use segment::{Segment, WORDS_PER_SECOND};
