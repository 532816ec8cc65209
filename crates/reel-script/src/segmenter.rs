//! Deterministic partitioning of a narration script into dialogue
//! segments sized for fixed-length generated clips.
//!
//! The floor/ceiling pair encodes an 8-second target clip at a speaking
//! rate of 2.5 words per second. Greedy accumulation favors meeting the
//! minimum speaking duration over respecting the ceiling; a repair pass
//! then fixes the trailing fragments the greedy split leaves behind.

use tracing::debug;

use reel_models::segment::{count_words, Segment};

use crate::error::{ScriptError, ScriptResult};
use crate::sentence::split_sentences;

/// Minimum words per segment (6 seconds of speech).
pub const MIN_WORDS_FLOOR: usize = 15;

/// Hard ceiling for greedy accumulation and sentence borrowing.
pub const MAX_WORDS_HARD: usize = 22;

/// Absolute cap when merging whole segments during repair.
pub const MERGE_CAP_WORDS: usize = 30;

/// A segment under construction: its sentences plus a running word count.
#[derive(Debug, Clone)]
struct RawSegment {
    sentences: Vec<String>,
    word_count: usize,
}

impl RawSegment {
    fn new(sentence: String) -> Self {
        let word_count = count_words(&sentence);
        Self {
            sentences: vec![sentence],
            word_count,
        }
    }

    fn push(&mut self, sentence: String) {
        self.word_count += count_words(&sentence);
        self.sentences.push(sentence);
    }

    fn text(&self) -> String {
        self.sentences.join(" ")
    }
}

/// Partition a script into ordered dialogue segments.
///
/// Deterministic and side-effect free; fails only on empty or
/// whitespace-only input.
pub fn segment_script(script: &str) -> ScriptResult<Vec<Segment>> {
    if script.trim().is_empty() {
        return Err(ScriptError::EmptyScript);
    }

    let sentences = split_sentences(script);
    let mut raw = accumulate(sentences);
    repair(&mut raw);

    let segments: Vec<Segment> = raw
        .into_iter()
        .enumerate()
        .map(|(index, r)| {
            let mut segment = Segment::new(index, r.text());
            segment.short = segment.word_count < MIN_WORDS_FLOOR;
            segment
        })
        .collect();

    debug!(
        segment_count = segments.len(),
        "Segmented script into dialogue units"
    );

    Ok(segments)
}

/// Greedy accumulation of sentences into raw segments.
///
/// Sentences are appended until the floor is met, even when that
/// overshoots the ceiling. Once the floor is met, a further sentence is
/// taken only if the combined count stays within the hard ceiling.
fn accumulate(sentences: Vec<String>) -> Vec<RawSegment> {
    let mut raw = Vec::new();
    let mut iter = sentences.into_iter().peekable();

    while let Some(first) = iter.next() {
        let mut segment = RawSegment::new(first);

        while let Some(next) = iter.peek() {
            let next_words = count_words(next);
            let take = if segment.word_count < MIN_WORDS_FLOOR {
                true
            } else {
                segment.word_count + next_words <= MAX_WORDS_HARD
            };
            if !take {
                break;
            }
            let next = iter.next().unwrap_or_default();
            segment.push(next);
        }

        raw.push(segment);
    }

    raw
}

/// Repair pass over raw segments below the word floor.
///
/// Strategies, in preference order:
/// 1. borrow the first sentence of the following segment when the
///    combined count lands within `[MIN_WORDS_FLOOR, MAX_WORDS_HARD]`
///    (borrowing preserves granularity better than merging);
/// 2. merge the entire following segment when the combined count stays
///    within the absolute cap;
/// 3. for a trailing short segment with no donor, merge backward into
///    the predecessor when the combined count stays within the cap.
///
/// A short segment with no applicable repair is kept as-is and later
/// flagged `short`.
fn repair(raw: &mut Vec<RawSegment>) {
    let mut i = 0;
    while i < raw.len() {
        if raw[i].word_count >= MIN_WORDS_FLOOR {
            i += 1;
            continue;
        }

        if i + 1 < raw.len() {
            let donor_first_words = count_words(&raw[i + 1].sentences[0]);
            let borrowed = raw[i].word_count + donor_first_words;

            if borrowed >= MIN_WORDS_FLOOR && borrowed <= MAX_WORDS_HARD {
                let sentence = raw[i + 1].sentences.remove(0);
                raw[i + 1].word_count -= donor_first_words;
                raw[i].push(sentence);
                if raw[i + 1].sentences.is_empty() {
                    raw.remove(i + 1);
                }
                // The donor may now be short; it gets its own turn
                i += 1;
                continue;
            }

            if raw[i].word_count + raw[i + 1].word_count <= MERGE_CAP_WORDS {
                let donor = raw.remove(i + 1);
                for sentence in donor.sentences {
                    raw[i].push(sentence);
                }
                // Re-check the same slot: the merge may not have reached
                // the floor yet
                continue;
            }

            // No repair fits; keep the short segment
            i += 1;
        } else if i > 0 && raw[i - 1].word_count + raw[i].word_count <= MERGE_CAP_WORDS {
            let trailing = raw.remove(i);
            for sentence in trailing.sentences {
                raw[i - 1].push(sentence);
            }
        } else {
            i += 1;
        }
    }
}
