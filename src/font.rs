//! Font resolution and the fontdue-backed face used for measuring and rasterising caption text.

use std::fs;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};

use crate::metrics::{TextMeasurer, TextSize};
use crate::shadow::{AlphaMask, ShadowRasterizer};
use crate::{Error, Result};

/// Directory searched for bare font names when the name is not itself a path.
pub const DEFAULT_FONT_DIR: &str = "assets/fonts";

/// Resolve a font reference to an existing file.
///
/// Lookup order:
/// - `font` as given (absolute or relative to the working directory)
/// - `search_dir/font`
///
/// A font that cannot be found is fatal: no caption can be laid out without one.
pub fn resolve_font_path(font: &str, search_dir: &Path) -> Result<PathBuf> {
    let direct = Path::new(font);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    let candidate = search_dir.join(font);
    if candidate.is_file() {
        return Ok(candidate);
    }

    Err(Error::FontNotFound(candidate.display().to_string()))
}

/// A loaded font face.
///
/// Its identity (the resolved path) is part of every cache key, so two faces loaded from the
/// same file share cache entries and faces from different files never do.
pub struct FontFace {
    id: String,
    font: Font,
}

impl FontFace {
    /// Resolve `font` against `search_dir` and load it.
    pub fn open(font: &str, search_dir: &Path) -> Result<Self> {
        let path = resolve_font_path(font, search_dir)?;
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::FontNotFound(path.display().to_string()),
            _ => Error::from(err),
        })?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    pub fn from_bytes(id: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let id = id.into();
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|reason| {
            Error::FontParse {
                path: id.clone(),
                reason: reason.to_owned(),
            }
        })?;
        Ok(Self { id, font })
    }

    /// Horizontal pen advance for `text`, kerning included.
    fn advance(&self, text: &str, px: f32) -> f32 {
        let mut width = 0.0_f32;
        let mut prev: Option<char> = None;
        for c in text.chars() {
            if let Some(p) = prev {
                width += self.font.horizontal_kern(p, c, px).unwrap_or(0.0);
            }
            width += self.font.metrics(c, px).advance_width;
            prev = Some(c);
        }
        width
    }

    fn line_height(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map_or(px, |m| m.new_line_size)
    }
}

impl TextMeasurer for FontFace {
    fn font_id(&self) -> &str {
        &self.id
    }

    fn measure(&self, text: &str, font_size: u32, stroke_width: u32) -> TextSize {
        let px = font_size as f32;
        let stroke = stroke_width.saturating_mul(2);
        TextSize {
            width: self.advance(text, px).ceil() as u32 + stroke,
            height: self.line_height(px).ceil() as u32 + stroke,
        }
    }
}

impl ShadowRasterizer for FontFace {
    fn rasterize(&self, text: &str, font_size: u32) -> AlphaMask {
        let px = font_size as f32;
        let ascent = self
            .font
            .horizontal_line_metrics(px)
            .map_or(px, |m| m.ascent);
        let width = self.advance(text, px).ceil() as usize;
        let height = self.line_height(px).ceil() as usize;
        let mut mask = AlphaMask::new(width, height);

        let mut pen = 0.0_f32;
        let mut prev: Option<char> = None;
        for c in text.chars() {
            if let Some(p) = prev {
                pen += self.font.horizontal_kern(p, c, px).unwrap_or(0.0);
            }
            let (m, bitmap) = self.font.rasterize(c, px);
            // fontdue places ymin relative to the baseline, positive up.
            let x0 = (pen + m.xmin as f32).round() as i64;
            let y0 = (ascent - m.height as f32 - m.ymin as f32).round() as i64;
            for row in 0..m.height {
                for col in 0..m.width {
                    mask.max_at(x0 + col as i64, y0 + row as i64, bitmap[row * m.width + col]);
                }
            }
            pen += m.advance_width;
            prev = Some(c);
        }

        mask
    }
}
