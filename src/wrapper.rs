//! Greedy line wrapping against measured glyph widths.

use std::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::metrics::{LayoutKey, MetricsCache, TextMeasurer};

/// One visually fittable row of a caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBlock {
    pub text: String,
    /// Measured width in pixels.
    pub width: u32,
    /// Measured height in pixels.
    pub height: u32,
}

/// The result of wrapping a paragraph: lines in logical (top to bottom) order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineLayout {
    pub lines: Vec<LineBlock>,
    /// Sum of every line's height.
    pub total_height: u32,
}

/// Typeface parameters that, together with the text and the font, determine a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapStyle {
    pub font_size: u32,
    pub stroke_width: u32,
    pub max_width: u32,
}

/// Non-fatal conditions hit while laying out text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutEvent {
    /// A single word is at least as wide as the frame; it was placed on its own line anyway.
    WordTooWide {
        text: String,
        width: u32,
        max_width: u32,
    },
}

/// Wraps text into lines no wider than a pixel budget.
///
/// The wrapper owns its [`MetricsCache`]; every layout is memoised by
/// `(text, font, size, stroke_width, max_width)`. Layout events are recorded when a layout is
/// first computed, so a cached re-layout does not repeat them.
pub struct LineWrapper<M> {
    measurer: M,
    cache: MetricsCache,
    events: Mutex<Vec<LayoutEvent>>,
}

impl<M: TextMeasurer> LineWrapper<M> {
    pub fn new(measurer: M, cache_capacity: NonZeroUsize) -> Self {
        Self {
            measurer,
            cache: MetricsCache::new(cache_capacity),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    pub fn cache(&self) -> &MetricsCache {
        &self.cache
    }

    /// Wrap `text` under `style`.
    ///
    /// Words are appended to a line buffer one at a time. While the buffer measures narrower
    /// than `max_width` it becomes the current candidate line. Once it does not fit, the last
    /// candidate is flushed and the word is retried on a fresh line; a word that does not fit
    /// even alone is emitted as its own line and reported as [`LayoutEvent::WordTooWide`].
    pub fn wrap(&self, text: &str, style: WrapStyle) -> Arc<LineLayout> {
        let key = LayoutKey {
            text: text.to_owned(),
            font: self.measurer.font_id().to_owned(),
            font_size: style.font_size,
            stroke_width: style.stroke_width,
            max_width: style.max_width,
        };
        self.cache.layout(key, || self.compute(text, style))
    }

    /// Whether `text` wraps into at most `line_count` lines.
    pub fn fits(&self, text: &str, style: WrapStyle, line_count: u32) -> bool {
        self.wrap(text, style).lines.len() <= line_count as usize
    }

    /// A fit predicate bound to a line count and style, for the caption splitter.
    pub fn fits_frame(&self, line_count: u32, style: WrapStyle) -> impl Fn(&str) -> bool + '_ {
        move |text: &str| self.fits(text, style, line_count)
    }

    /// Drain the layout events recorded so far.
    pub fn take_events(&self) -> Vec<LayoutEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn compute(&self, text: &str, style: WrapStyle) -> LineLayout {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut lines = Vec::new();
        let mut candidate: Option<LineBlock> = None;
        let mut buffer = String::new();

        let mut i = 0;
        while i < words.len() {
            if !buffer.is_empty() {
                buffer.push(' ');
            }
            buffer.push_str(words[i]);

            let size = self
                .measurer
                .measure(&buffer, style.font_size, style.stroke_width);

            if size.width < style.max_width {
                candidate = Some(LineBlock {
                    text: buffer.clone(),
                    width: size.width,
                    height: size.height,
                });
                i += 1;
                continue;
            }

            match candidate.take() {
                Some(line) => lines.push(line),
                None => {
                    tracing::info!(
                        word = %buffer,
                        width = size.width,
                        max_width = style.max_width,
                        "word is too long for the frame"
                    );
                    self.events.lock().push(LayoutEvent::WordTooWide {
                        text: buffer.clone(),
                        width: size.width,
                        max_width: style.max_width,
                    });
                    lines.push(LineBlock {
                        text: buffer.clone(),
                        width: size.width,
                        height: size.height,
                    });
                    i += 1;
                }
            }
            buffer.clear();
        }

        if let Some(line) = candidate {
            lines.push(line);
        }

        let total_height = lines.iter().map(|l| l.height).sum();
        LineLayout {
            lines,
            total_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TextSize;

    /// Every character is 10px wide; lines are 20px tall plus stroke.
    struct Mono;

    impl TextMeasurer for Mono {
        fn font_id(&self) -> &str {
            "mono"
        }

        fn measure(&self, text: &str, _font_size: u32, stroke_width: u32) -> TextSize {
            TextSize {
                width: text.chars().count() as u32 * 10 + stroke_width * 2,
                height: 20 + stroke_width * 2,
            }
        }
    }

    fn wrapper() -> LineWrapper<Mono> {
        LineWrapper::new(Mono, NonZeroUsize::new(64).unwrap())
    }

    fn style(max_width: u32) -> WrapStyle {
        WrapStyle {
            font_size: 10,
            stroke_width: 0,
            max_width,
        }
    }

    fn texts(layout: &LineLayout) -> Vec<&str> {
        layout.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn packs_words_greedily() {
        // "hello world" is 110px; adding " foo" would be 150px.
        let layout = wrapper().wrap("hello world foo", style(120));
        assert_eq!(texts(&layout), vec!["hello world", "foo"]);
        assert_eq!(layout.total_height, 40);
    }

    #[test]
    fn width_equal_to_max_does_not_fit() {
        let layout = wrapper().wrap("ab cd", style(50));
        assert_eq!(texts(&layout), vec!["ab", "cd"]);
    }

    #[test]
    fn overflowing_word_gets_its_own_line_and_an_event() {
        let w = wrapper();
        let layout = w.wrap("a enormous b", style(60));
        assert_eq!(texts(&layout), vec!["a", "enormous", "b"]);
        assert_eq!(
            w.take_events(),
            vec![LayoutEvent::WordTooWide {
                text: "enormous".to_owned(),
                width: 80,
                max_width: 60,
            }]
        );
        assert!(w.take_events().is_empty());
    }

    #[test]
    fn lines_never_exceed_max_width_unless_single_word() {
        let w = wrapper();
        let text = "the quick brown fox jumps over the extraordinarily lazy dog";
        let layout = w.wrap(text, style(100));
        for line in &layout.lines {
            assert!(line.width < 100 || !line.text.contains(' '), "{line:?}");
        }
        let rejoined = texts(&layout).join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn stroke_counts_towards_width_and_height() {
        let layout = wrapper().wrap(
            "abc abc",
            WrapStyle {
                font_size: 10,
                stroke_width: 5,
                max_width: 80,
            },
        );
        // "abc abc" is 70 + 10 = 80, which no longer fits.
        assert_eq!(texts(&layout), vec!["abc", "abc"]);
        assert_eq!(layout.total_height, 60);
    }

    #[test]
    fn repeated_wrap_is_served_from_cache() {
        let w = wrapper();
        let first = w.wrap("hello world foo", style(120));
        let second = w.wrap("hello world foo", style(120));
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(w.cache().layout_stats().hits, 1);

        // A different width is a different key.
        w.wrap("hello world foo", style(200));
        assert_eq!(w.cache().layout_stats().misses, 2);
    }

    #[test]
    fn fits_respects_line_count() {
        let w = wrapper();
        let fit = w.fits_frame(2, style(120));
        assert!(fit("hello world foo"));
        assert!(!fit("hello world foo bar baz qux"));
    }

    #[test]
    fn empty_text_has_no_lines() {
        let layout = wrapper().wrap("   ", style(100));
        assert!(layout.lines.is_empty());
        assert_eq!(layout.total_height, 0);
    }
}
