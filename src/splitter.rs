//! Splitting a segment's timed words into captions that fit the frame.

use crate::segments::{Segment, Word};
use crate::shaper::{needs_shaping, shape};

/// Characters that end a sentence when they close a word.
const SENTENCE_END: &[char] = &['.', '!', '?', '؟'];

/// A group of consecutive words displayed together.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub start: f64,
    pub end: f64,
    /// The timed words, as transcribed.
    pub words: Vec<Word>,
    /// Display form of each word, index-aligned with `words`.
    pub shaped: Vec<String>,
}

impl Caption {
    fn starting_with(word: Word, shaped: String) -> Self {
        Self {
            start: word.start,
            end: word.end,
            words: vec![word],
            shaped: vec![shaped],
        }
    }

    fn push(&mut self, word: Word, shaped: String) {
        self.end = word.end;
        self.words.push(word);
        self.shaped.push(shaped);
    }

    /// The caption's display text: shaped words joined by single spaces, in logical order.
    pub fn text(&self) -> String {
        self.shaped.join(" ")
    }

    /// Whether any word is in a right-to-left script.
    pub fn is_rtl(&self) -> bool {
        self.words.iter().any(|w| needs_shaping(&w.text))
    }

    fn ends_sentence(&self) -> bool {
        self.words
            .last()
            .is_some_and(|w| w.text.trim_end().ends_with(SENTENCE_END))
    }
}

/// Group the words of `segment` into captions.
///
/// Words are appended to the current caption while `fit` accepts the resulting display text.
/// A new caption starts when it would not, or, unless `allow_partial_sentences` is set, when
/// the previous word ended a sentence. A word that does not fit on its own still becomes a
/// caption by itself.
///
/// Words with no visible text are folded into a neighbouring word's time span so captions
/// stay contiguous and every caption word is something the renderer can draw.
pub fn split_captions(
    segment: &Segment,
    fit: &dyn Fn(&str) -> bool,
    allow_partial_sentences: bool,
) -> Vec<Caption> {
    let mut captions = Vec::new();
    let mut current: Option<Caption> = None;

    for word in visible_words(&segment.words) {
        // Each raw token is shaped exactly once, here.
        let shaped = shape(word.text.trim());

        if let Some(mut caption) = current.take() {
            let sentence_break = !allow_partial_sentences && caption.ends_sentence();
            if !sentence_break && fit(&format!("{} {}", caption.text(), shaped)) {
                caption.push(word, shaped);
                current = Some(caption);
                continue;
            }
            captions.push(caption);
        }

        current = Some(Caption::starting_with(word, shaped));
    }

    captions.extend(current);
    captions
}

/// Drop words whose trimmed text is empty, giving their time to the previous visible word
/// (or, before the first visible word, to the next one).
fn visible_words(words: &[Word]) -> Vec<Word> {
    let mut out: Vec<Word> = Vec::with_capacity(words.len());
    let mut pending_start: Option<f64> = None;

    for word in words {
        if word.text.trim().is_empty() {
            match out.last_mut() {
                Some(prev) => prev.end = prev.end.max(word.end),
                None => {
                    pending_start.get_or_insert(word.start);
                }
            }
            continue;
        }

        let mut word = word.clone();
        if let Some(start) = pending_start.take() {
            word.start = start;
        }
        out.push(word);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word {
            text: text.to_owned(),
            start,
            end,
        }
    }

    fn segment(words: Vec<Word>) -> Segment {
        let start = words.first().map_or(0.0, |w| w.start);
        let end = words.last().map_or(0.0, |w| w.end);
        let text = words
            .iter()
            .map(|w| w.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        Segment {
            text,
            start,
            end,
            words,
        }
    }

    fn max_chars(limit: usize) -> impl Fn(&str) -> bool {
        move |text: &str| text.chars().count() <= limit
    }

    fn caption_texts(captions: &[Caption]) -> Vec<String> {
        captions.iter().map(Caption::text).collect()
    }

    #[test]
    fn keeps_everything_together_when_it_fits() {
        let seg = segment(vec![word("hello", 0.0, 1.0), word("world", 1.0, 2.0)]);
        let captions = split_captions(&seg, &max_chars(100), false);
        assert_eq!(caption_texts(&captions), vec!["hello world"]);
        assert_eq!((captions[0].start, captions[0].end), (0.0, 2.0));
    }

    #[test]
    fn splits_when_candidate_does_not_fit() {
        let seg = segment(vec![
            word(" one", 0.0, 1.0),
            word(" two", 1.0, 2.0),
            word(" three", 2.0, 3.0),
        ]);
        let captions = split_captions(&seg, &max_chars(7), false);
        assert_eq!(caption_texts(&captions), vec!["one two", "three"]);
        assert_eq!((captions[1].start, captions[1].end), (2.0, 3.0));
    }

    #[test]
    fn sentence_end_starts_a_new_caption() {
        let seg = segment(vec![
            word(" Treat.", 0.0, 0.8),
            word(" Yo.", 0.8, 1.5),
            word(" Self.", 1.5, 2.4),
        ]);
        let strict = split_captions(&seg, &max_chars(100), false);
        assert_eq!(caption_texts(&strict), vec!["Treat.", "Yo.", "Self."]);

        let relaxed = split_captions(&seg, &max_chars(100), true);
        assert_eq!(caption_texts(&relaxed), vec!["Treat. Yo. Self."]);
    }

    #[test]
    fn oversized_word_stands_alone() {
        let seg = segment(vec![word("a", 0.0, 1.0), word("gigantic", 1.0, 2.0)]);
        let captions = split_captions(&seg, &max_chars(3), false);
        assert_eq!(caption_texts(&captions), vec!["a", "gigantic"]);
    }

    #[test]
    fn empty_words_are_folded_into_neighbours() {
        let seg = segment(vec![
            word("", 0.0, 0.5),
            word("hi", 0.5, 1.0),
            word(" ", 1.0, 1.5),
            word("there", 1.5, 2.0),
            word("", 2.0, 2.5),
        ]);
        let captions = split_captions(&seg, &max_chars(100), false);
        assert_eq!(captions.len(), 1);
        let bounds: Vec<(f64, f64)> = captions[0].words.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(bounds, vec![(0.0, 1.5), (1.5, 2.5)]);
        assert_eq!((captions[0].start, captions[0].end), (0.0, 2.5));
    }

    #[test]
    fn no_visible_words_yields_no_captions() {
        let seg = segment(vec![word("", 0.0, 1.0), word("", 1.0, 2.0)]);
        assert!(split_captions(&seg, &max_chars(100), false).is_empty());
    }

    #[test]
    fn rtl_words_are_shaped_once() {
        let seg = segment(vec![word(" \u{0628}\u{062A}\u{0628}", 0.0, 1.0)]);
        let captions = split_captions(&seg, &max_chars(100), false);
        assert!(captions[0].is_rtl());
        assert_eq!(captions[0].shaped, vec!["\u{FE90}\u{FE98}\u{FE91}".to_owned()]);
    }
}
