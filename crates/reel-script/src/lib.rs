//! Script processing for StoryReel: deterministic segmentation of a
//! narration script into time-bounded dialogue units, and conversion of
//! each unit into a generation-spec payload.

pub mod error;
pub mod segmenter;
pub mod sentence;
pub mod spec;

pub use error::{ScriptError, ScriptResult};
pub use segmenter::{segment_script, MAX_WORDS_HARD, MERGE_CAP_WORDS, MIN_WORDS_FLOOR};
pub use sentence::split_sentences;
pub use spec::{estimate_generation_secs, GenerationSpec, BASE_GENERATION_SECS};
