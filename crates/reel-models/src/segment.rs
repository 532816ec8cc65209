//! Narration segments produced by the script segmenter.

use serde::{Deserialize, Serialize};

/// Speaking rate used to convert word counts into clip durations
/// (150 words per minute).
pub const WORDS_PER_SECOND: f64 = 2.5;

/// A time-bounded slice of narration text destined for one generation job.
///
/// Segments are immutable once the segmenter has produced them; the
/// `short` flag marks segments that ended up below the word floor with no
/// valid repair (accepted edge case, never dropped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Position within the script (0-based, contiguous)
    pub index: usize,

    /// Dialogue text for this segment
    pub text: String,

    /// Number of whitespace-separated words
    pub word_count: usize,

    /// Target speaking duration in seconds, derived from the word count.
    /// Diagnostic only; never used to reject a segment.
    pub estimated_duration_secs: f64,

    /// True when the segment is below the word floor and no repair applied
    #[serde(default)]
    pub short: bool,
}

impl Segment {
    /// Create a segment from its index and text, deriving the word count
    /// and speaking duration.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = count_words(&text);
        Self {
            index,
            text,
            word_count,
            estimated_duration_secs: word_count as f64 / WORDS_PER_SECOND,
            short: false,
        }
    }
}

/// Count whitespace-separated words in a piece of dialogue.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
