use std::io::Read;

use serde::Deserialize;

use crate::{Error, Result};

/// Options that control how captions are laid out and timed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (batch jobs, tests) can construct options programmatically
///
/// Colors are carried through verbatim for the rendering collaborator; the layout engine
/// never interprets them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptionOpts {
    /// Font file name or path. Resolved through [`crate::font::resolve_font_path`].
    pub font: String,

    /// Font size in pixels.
    pub font_size: u32,

    pub font_color: String,

    /// Outline width in pixels. Measured widths and heights include the stroke.
    pub stroke_width: u32,

    pub stroke_color: String,

    /// Whether to emit one timed instruction set per word so the active word can be highlighted.
    pub highlight_current_word: bool,

    pub word_highlight_color: String,

    /// Maximum number of wrapped lines a single caption may occupy.
    pub line_count: u32,

    /// Horizontal padding in pixels applied on both sides of the frame.
    pub padding: u32,

    /// Shadow opacity in `[0.0, 1.0]`. `0.0` disables shadows.
    pub shadow_strength: f32,

    /// Shadow blur radius as a fraction of the font size.
    pub shadow_blur: f32,

    /// Short grammatical prefix token merged into its following word (e.g. Persian `"می"`).
    ///
    /// `None` disables prefix merging.
    pub merge_prefix: Option<String>,

    /// When `false`, a caption never continues past a word that ends a sentence.
    pub allow_partial_sentences: bool,

    /// Maximum number of entries kept in each metrics cache table.
    pub cache_capacity: usize,
}

impl Default for CaptionOpts {
    fn default() -> Self {
        Self {
            font: "Bangers-Regular.ttf".to_owned(),
            font_size: 130,
            font_color: "yellow".to_owned(),
            stroke_width: 3,
            stroke_color: "black".to_owned(),
            highlight_current_word: true,
            word_highlight_color: "red".to_owned(),
            line_count: 2,
            padding: 50,
            shadow_strength: 1.0,
            shadow_blur: 0.1,
            merge_prefix: Some("می".to_owned()),
            allow_partial_sentences: false,
            cache_capacity: 4096,
        }
    }
}

impl CaptionOpts {
    /// Load options from a JSON document. Missing fields take their defaults.
    pub fn from_json_reader<R: Read>(r: R) -> Result<Self> {
        let opts: Self = serde_json::from_reader(r)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check the options once, up front, so layout code can rely on them.
    pub fn validate(&self) -> Result<()> {
        if self.font.trim().is_empty() {
            return Err(Error::InvalidOpts("font must be provided".to_owned()));
        }
        if self.font_size == 0 {
            return Err(Error::InvalidOpts("font_size must be greater than 0".to_owned()));
        }
        if self.line_count == 0 {
            return Err(Error::InvalidOpts("line_count must be at least 1".to_owned()));
        }
        if self.cache_capacity == 0 {
            return Err(Error::InvalidOpts(
                "cache_capacity must be at least 1".to_owned(),
            ));
        }
        if !self.shadow_strength.is_finite() || !(0.0..=1.0).contains(&self.shadow_strength) {
            return Err(Error::InvalidOpts(format!(
                "shadow_strength must be within [0, 1], got {}",
                self.shadow_strength
            )));
        }
        if !self.shadow_blur.is_finite() || self.shadow_blur < 0.0 {
            return Err(Error::InvalidOpts(format!(
                "shadow_blur must be a non-negative number, got {}",
                self.shadow_blur
            )));
        }
        Ok(())
    }
}

/// Pixel geometry of the target video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width available to text once `padding` is removed from both sides.
    pub fn text_width(&self, padding: u32) -> u32 {
        self.width.saturating_sub(padding.saturating_mul(2))
    }
}
