#![allow(dead_code)]

use captacity::metrics::{TextMeasurer, TextSize};
use captacity::opts::CaptionOpts;

/// Every character is 10px wide and every line is 20px tall (plus stroke on both sides).
pub struct Mono;

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

/// Options with no padding or stroke so widths are easy to reason about.
pub fn plain_opts() -> CaptionOpts {
    CaptionOpts {
        font: "mono".to_owned(),
        font_size: 10,
        stroke_width: 0,
        padding: 0,
        line_count: 2,
        merge_prefix: None,
        ..CaptionOpts::default()
    }
}
