//! Word-level timing synthesis for segments that arrive with only coarse timestamps.
//!
//! Each word gets a slice of the segment's time span proportional to its character length.
//! Timestamps are rounded to the millisecond only when assigned; the running clock stays
//! unrounded so rounding never accumulates across a long segment.

use crate::segments::{Segment, Word};

/// Characters removed from segment text before allocating time. They take no visible time.
pub const STRIPPED_PUNCTUATION: &[char] = &[
    ';', '"', '\'', ',', '.', '!', '?', '،', ':', '؟', '؛', '(', ')', '[', ']', '{', '}', '<', '>',
    '«', '»',
];

pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect()
}

/// Round seconds to millisecond precision.
pub fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Split `total_duration` across words with the given character lengths.
///
/// - A zero-length word gets half of the average per-word duration so it still occupies a
///   visible slot.
/// - The rest of the duration is shared among the other words in proportion to their length.
/// - If every word is empty the duration is split equally.
///
/// The returned durations always sum to `total_duration`.
pub fn allocate_durations(lengths: &[usize], total_duration: f64) -> Vec<f64> {
    if lengths.is_empty() {
        return Vec::new();
    }

    let count = lengths.len() as f64;
    let total_length: usize = lengths.iter().sum();
    if total_length == 0 {
        return vec![total_duration / count; lengths.len()];
    }

    let floor = total_duration / (2.0 * count);
    let empty = lengths.iter().filter(|&&len| len == 0).count() as f64;
    // At least one word is non-empty, so this keeps at least half of the duration.
    let shared = total_duration - empty * floor;

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                floor
            } else {
                (len as f64 / total_length as f64) * shared
            }
        })
        .collect()
}

/// Replace `segment.words` with synthesized per-word timings.
///
/// The segment text is cleaned of [`STRIPPED_PUNCTUATION`] and split on whitespace; tokens made
/// only of punctuation keep their slot as empty words. The first word starts exactly at
/// `segment.start` and the last word ends exactly at `segment.end`.
pub fn synthesize(segment: &mut Segment) {
    let tokens: Vec<String> = segment
        .text
        .split_whitespace()
        .map(strip_punctuation)
        .collect();
    segment.text = strip_punctuation(&segment.text).trim().to_owned();
    segment.words.clear();

    let lengths: Vec<usize> = tokens.iter().map(|t| t.trim().chars().count()).collect();
    if lengths.iter().all(|&len| len == 0) && !lengths.is_empty() {
        tracing::debug!(
            start = segment.start,
            end = segment.end,
            words = lengths.len(),
            "segment has no visible characters; splitting time equally"
        );
    }

    let durations = allocate_durations(&lengths, segment.duration());
    let mut current = segment.start;
    for (token, duration) in tokens.into_iter().zip(durations) {
        segment.words.push(Word {
            text: token,
            start: round_ms(current),
            end: round_ms(current + duration),
        });
        current += duration;
    }

    if let Some(first) = segment.words.first_mut() {
        first.start = segment.start;
    }
    if let Some(last) = segment.words.last_mut() {
        last.end = segment.end;
    }
}

/// Synthesize word timings only when the transcriber supplied none.
///
/// Returns whether synthesis ran.
pub fn ensure_word_timings(segment: &mut Segment) -> bool {
    if !segment.words.is_empty() {
        return false;
    }
    synthesize(segment);
    true
}
