//! Caption scheduling: from transcript segments to timed, positioned render instructions.
//!
//! The scheduler wires the pieces together:
//! - synthesize word timings where the transcriber gave none, then merge prefix tokens
//! - split each segment into captions that fit the frame
//! - for every visible window of a caption, wrap it and place each line vertically
//!
//! It owns the line wrapper (and through it the metrics cache) for the whole run, so layouts
//! computed for one highlighted word are reused for every other word of the same caption.

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::font::FontFace;
use crate::metrics::{ShadowKey, TextMeasurer};
use crate::opts::{CaptionOpts, FrameGeometry};
use crate::segments::Segment;
use crate::shadow::{ShadowMask, ShadowRasterizer};
use crate::shaper::merge_prefix;
use crate::splitter::{Caption, split_captions};
use crate::timing::ensure_word_timings;
use crate::wrapper::{LayoutEvent, LineBlock, LineWrapper, WrapStyle};
use crate::{Error, Result};

/// One timed, positioned line of caption output for the rendering collaborator.
///
/// Lines of the same caption share a time window and overlap in time by design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInstruction {
    /// Display text of the line (shaped, in visual word order).
    pub text: String,
    /// Top edge of the line in pixels from the top of the frame.
    pub vertical_offset: i32,
    pub visible_from: f64,
    pub visible_until: f64,
    /// Index into `text.split_whitespace()` of the word to highlight, if any.
    pub highlighted_word_index: Option<usize>,
}

/// A time window during which a caption is shown unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubWindow {
    pub start: f64,
    pub end: f64,
    /// Index of the active word within the caption, when highlighting.
    pub active_word: Option<usize>,
}

/// Compute the visible windows of `caption`.
///
/// Without highlighting there is one window spanning the caption. With highlighting there is
/// one window per word, each ending where the next word starts so the highlight never leaves a
/// gap; the last window ends with its word.
pub fn sub_windows(caption: &Caption, highlight: bool) -> Vec<SubWindow> {
    if !highlight {
        return vec![SubWindow {
            start: caption.start,
            end: caption.end,
            active_word: None,
        }];
    }

    caption
        .words
        .iter()
        .enumerate()
        .map(|(i, word)| SubWindow {
            start: word.start,
            end: caption.words.get(i + 1).map_or(word.end, |next| next.start),
            active_word: Some(i),
        })
        .collect()
}

pub struct CaptionScheduler<M> {
    opts: CaptionOpts,
    frame: FrameGeometry,
    wrapper: LineWrapper<M>,
}

impl CaptionScheduler<FontFace> {
    /// Build a scheduler measuring with the font named in `opts`, resolved against `font_dir`.
    pub fn from_font(opts: CaptionOpts, frame: FrameGeometry, font_dir: &Path) -> Result<Self> {
        opts.validate()?;
        let face = FontFace::open(&opts.font, font_dir)?;
        Self::new(opts, frame, face)
    }
}

impl<M: TextMeasurer> CaptionScheduler<M> {
    pub fn new(opts: CaptionOpts, frame: FrameGeometry, measurer: M) -> Result<Self> {
        opts.validate()?;
        let capacity = NonZeroUsize::new(opts.cache_capacity)
            .ok_or_else(|| Error::InvalidOpts("cache_capacity must be at least 1".to_owned()))?;
        Ok(Self {
            opts,
            frame,
            wrapper: LineWrapper::new(measurer, capacity),
        })
    }

    pub fn opts(&self) -> &CaptionOpts {
        &self.opts
    }

    pub fn frame(&self) -> FrameGeometry {
        self.frame
    }

    pub fn wrapper(&self) -> &LineWrapper<M> {
        &self.wrapper
    }

    /// The wrap style implied by the options and frame.
    pub fn style(&self) -> WrapStyle {
        WrapStyle {
            font_size: self.opts.font_size,
            stroke_width: self.opts.stroke_width,
            max_width: self.frame.text_width(self.opts.padding),
        }
    }

    /// Drain the non-fatal layout events recorded so far.
    pub fn take_events(&self) -> Vec<LayoutEvent> {
        self.wrapper.take_events()
    }

    /// Normalize timing: synthesize word timings where missing, then merge prefix tokens.
    ///
    /// The result is what a persisted subtitle artifact should contain.
    pub fn prepare(&self, segments: &[Segment]) -> Vec<Segment> {
        segments
            .iter()
            .cloned()
            .map(|mut seg| {
                if ensure_word_timings(&mut seg) {
                    tracing::debug!(
                        start = seg.start,
                        end = seg.end,
                        words = seg.words.len(),
                        "synthesized word timings"
                    );
                }
                if let Some(prefix) = &self.opts.merge_prefix {
                    merge_prefix(&mut seg.words, prefix);
                }
                seg
            })
            .collect()
    }

    /// Split already-prepared segments into captions accepted by `fit`.
    pub fn captions(&self, segments: &[Segment], fit: &dyn Fn(&str) -> bool) -> Vec<Caption> {
        segments
            .iter()
            .flat_map(|seg| split_captions(seg, fit, self.opts.allow_partial_sentences))
            .collect()
    }

    /// Schedule render instructions for `segments`.
    ///
    /// `fit` decides how words are grouped into captions; `highlight` selects per-word windows.
    /// Every caption is independent; only the metrics cache carries over between them.
    pub fn schedule(
        &self,
        segments: &[Segment],
        fit: &dyn Fn(&str) -> bool,
        highlight: bool,
    ) -> Vec<RenderInstruction> {
        let prepared = self.prepare(segments);
        let captions = self.captions(&prepared, fit);

        let mut out = Vec::new();
        for caption in &captions {
            self.schedule_caption(caption, highlight, &mut out);
        }

        tracing::debug!(
            segments = segments.len(),
            captions = captions.len(),
            instructions = out.len(),
            "scheduled captions"
        );
        out
    }

    /// Schedule using the configured line count and highlight setting.
    pub fn run(&self, segments: &[Segment]) -> Vec<RenderInstruction> {
        let fit = self.wrapper.fits_frame(self.opts.line_count, self.style());
        self.schedule(segments, &fit, self.opts.highlight_current_word)
    }

    fn schedule_caption(&self, caption: &Caption, highlight: bool, out: &mut Vec<RenderInstruction>) {
        let text = caption.text();
        let rtl = caption.is_rtl();
        let center = self.frame.height as i32 / 2;

        for window in sub_windows(caption, highlight) {
            let layout = self.wrapper.wrap(&text, self.style());
            let mut offset = center - layout.total_height as i32 / 2;
            // Counts words across the whole caption; reset for every window.
            let mut word_cursor = 0;
            for line in &layout.lines {
                out.push(line_instruction(line, &window, rtl, offset, &mut word_cursor));
                offset += line.height as i32;
            }
        }
    }
}

impl<M: ShadowRasterizer> CaptionScheduler<M> {
    /// The drop shadow for a line of text, or `None` when shadows are disabled.
    pub fn shadow(&self, text: &str) -> Option<Arc<ShadowMask>> {
        if self.opts.shadow_strength <= 0.0 {
            return None;
        }
        let key = ShadowKey::new(
            text,
            self.wrapper.measurer().font_id(),
            self.opts.font_size,
            self.opts.shadow_blur,
            self.opts.shadow_strength,
        );
        Some(self.wrapper.cache().shadow(self.wrapper.measurer(), key))
    }
}

/// Build the instruction for one line and advance `word_cursor` past its words.
///
/// `word_cursor` is the caption-wide index of the line's first word.
fn line_instruction(
    line: &LineBlock,
    window: &SubWindow,
    rtl: bool,
    offset: i32,
    word_cursor: &mut usize,
) -> RenderInstruction {
    let words: Vec<&str> = line.text.split_whitespace().collect();
    let first = *word_cursor;
    let count = words.len();
    *word_cursor += count;

    let mut highlighted = window
        .active_word
        .filter(|&k| k >= first && k < first + count)
        .map(|k| k - first);

    let text = if rtl {
        highlighted = highlighted.map(|i| count - 1 - i);
        words.iter().rev().copied().collect::<Vec<_>>().join(" ")
    } else {
        line.text.clone()
    };

    RenderInstruction {
        text,
        vertical_offset: offset,
        visible_from: window.start,
        visible_until: window.end,
        highlighted_word_index: highlighted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::Word;

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word {
            text: text.to_owned(),
            start,
            end,
        }
    }

    fn caption(words: Vec<Word>) -> Caption {
        Caption {
            start: words[0].start,
            end: words[words.len() - 1].end,
            shaped: words.iter().map(|w| w.text.clone()).collect(),
            words,
        }
    }

    #[test]
    fn single_window_without_highlight() {
        let c = caption(vec![word("a", 1.0, 2.0), word("b", 2.5, 3.0)]);
        assert_eq!(
            sub_windows(&c, false),
            vec![SubWindow {
                start: 1.0,
                end: 3.0,
                active_word: None,
            }]
        );
    }

    #[test]
    fn highlight_windows_close_gaps_between_words() {
        let c = caption(vec![
            word("a", 1.0, 1.5),
            word("b", 2.0, 2.5),
            word("c", 3.0, 3.5),
        ]);
        let windows = sub_windows(&c, true);
        let bounds: Vec<(f64, f64)> = windows.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(bounds, vec![(1.0, 2.0), (2.0, 3.0), (3.0, 3.5)]);
        assert_eq!(windows[2].active_word, Some(2));
    }

    #[test]
    fn line_instruction_highlights_only_its_own_words() {
        let line = LineBlock {
            text: "c d".to_owned(),
            width: 30,
            height: 20,
        };
        let window = SubWindow {
            start: 0.0,
            end: 1.0,
            active_word: Some(3),
        };

        let mut cursor = 2;
        let inst = line_instruction(&line, &window, false, 10, &mut cursor);
        assert_eq!(inst.highlighted_word_index, Some(1));
        assert_eq!(cursor, 4);

        let mut cursor = 4;
        let inst = line_instruction(&line, &window, false, 10, &mut cursor);
        assert_eq!(inst.highlighted_word_index, None);
    }

    #[test]
    fn rtl_line_reverses_words_and_highlight_index() {
        let line = LineBlock {
            text: "x y z".to_owned(),
            width: 50,
            height: 20,
        };
        let window = SubWindow {
            start: 0.0,
            end: 1.0,
            active_word: Some(0),
        };
        let mut cursor = 0;
        let inst = line_instruction(&line, &window, true, 0, &mut cursor);
        assert_eq!(inst.text, "z y x");
        assert_eq!(inst.highlighted_word_index, Some(2));
    }
}
