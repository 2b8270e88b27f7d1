//! Text shaping for display, plus the prefix-merge rule applied to timed words.
//!
//! Shaping is applied exactly once per raw token. Its output is display text (presentation
//! forms in visual order); feeding it back through [`shape`] is not supported.

use unicode_bidi::BidiInfo;

use crate::segments::Word;

/// Whether `text` contains characters from the Arabic, Arabic Supplement or Arabic
/// Extended-A blocks.
pub fn needs_shaping(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
    })
}

/// Shape a single raw word for display.
///
/// Arabic-script words get contextual letter forms and are then reordered from logical to
/// visual order. Everything else is returned unchanged.
pub fn shape(word: &str) -> String {
    if !needs_shaping(word) {
        return word.to_owned();
    }
    reorder_for_display(&crate::reshape::reshape(word))
}

/// Reorder `text` from logical to visual order using the Unicode bidirectional algorithm.
fn reorder_for_display(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let bidi_info = BidiInfo::new(text, None);
    let mut out = String::with_capacity(text.len());
    for para in &bidi_info.paragraphs {
        let line = para.range.clone();
        out.push_str(&bidi_info.reorder_line(para, line));
    }
    out
}

/// Merge each occurrence of `prefix` into the word that follows it.
///
/// The merged word's text is the prefix directly followed by the next word (no space), and it
/// spans from the prefix's start to the next word's end. A merged word is not re-examined as a
/// prefix, and a trailing prefix with nothing after it is left alone.
pub fn merge_prefix(words: &mut Vec<Word>, prefix: &str) {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return;
    }

    let mut i = 0;
    while i + 1 < words.len() {
        if words[i].text.trim() == prefix {
            let next = words.remove(i + 1);
            let word = &mut words[i];
            word.text = format!("{}{}", word.text.trim(), next.text.trim());
            word.end = next.end;
        }
        i += 1;
    }
}
