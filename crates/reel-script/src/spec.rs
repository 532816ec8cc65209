//! Generation-spec building: one segment plus generation parameters
//! becomes a submission payload with a seeded time estimate.

use serde::{Deserialize, Serialize};

use reel_models::{Quality, Segment};

/// Base generation time for a standard-quality clip, in seconds.
pub const BASE_GENERATION_SECS: f64 = 120.0;

/// Dialogue length above which the complexity multiplier kicks in.
const COMPLEXITY_THRESHOLD_CHARS: usize = 100;

/// Multiplier applied to long dialogue.
const COMPLEXITY_MULTIPLIER: f64 = 1.2;

/// Submission payload for one segment. Pure transformation; no network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSpec {
    /// Index of the source segment
    pub segment_index: usize,
    /// Prompt sent to the generation service
    pub prompt: String,
    /// Requested quality tier
    pub quality: Quality,
    /// Position within the dispatch (1-based)
    pub sequence_position: usize,
    /// Total number of clips in the dispatch
    pub total_in_sequence: usize,
    /// Estimated generation time in seconds; seeds the simulated
    /// progress timeline and the estimated-completion timestamp
    pub estimated_secs: f64,
}

impl GenerationSpec {
    /// Build the submission payload for a segment.
    pub fn build(
        segment: &Segment,
        quality: Quality,
        sequence_position: usize,
        total_in_sequence: usize,
    ) -> Self {
        Self {
            segment_index: segment.index,
            prompt: format!(
                "Clip {} of {}. The narrator says: \"{}\"",
                sequence_position, total_in_sequence, segment.text
            ),
            quality,
            sequence_position,
            total_in_sequence,
            estimated_secs: estimate_generation_secs(segment, quality),
        }
    }
}

/// Estimated generation time:
/// `base × qualityMultiplier × complexityMultiplier`.
pub fn estimate_generation_secs(segment: &Segment, quality: Quality) -> f64 {
    let complexity = if segment.text.len() > COMPLEXITY_THRESHOLD_CHARS {
        COMPLEXITY_MULTIPLIER
    } else {
        1.0
    };
    BASE_GENERATION_SECS * quality.time_multiplier() * complexity
}
