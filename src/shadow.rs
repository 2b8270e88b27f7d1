//! Drop-shadow render products.
//!
//! A shadow is the caption text rasterised as a coverage mask, padded and box-blurred, then
//! scaled by an opacity. Producing one is the most expensive per-line operation in a run, so
//! results are memoised through [`crate::metrics::MetricsCache::shadow`].

use crate::metrics::TextMeasurer;

/// An 8-bit coverage mask, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl AlphaMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Combine `value` into the pixel at `(x, y)` keeping the larger coverage.
    /// Out-of-bounds coordinates are ignored.
    pub fn max_at(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.width + x as usize;
        self.data[i] = self.data[i].max(value);
    }

    /// Return a copy of this mask with `pad` empty pixels on every side.
    fn padded(&self, pad: usize) -> Self {
        let mut out = Self::new(self.width + pad * 2, self.height + pad * 2);
        for y in 0..self.height {
            let src = &self.data[y * self.width..(y + 1) * self.width];
            let start = (y + pad) * out.width + pad;
            out.data[start..start + self.width].copy_from_slice(src);
        }
        out
    }
}

/// Source of glyph coverage for shadow rendering.
pub trait ShadowRasterizer: TextMeasurer {
    /// Rasterise `text` on a single line at `font_size` pixels.
    fn rasterize(&self, text: &str, font_size: u32) -> AlphaMask;
}

/// A finished, blurred shadow ready to be composited behind a caption line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowMask {
    pub mask: AlphaMask,
    /// Blur radius actually applied, in pixels. The mask is offset by this much on each side
    /// relative to the unpadded text.
    pub radius: usize,
}

/// Render the shadow for `text`.
///
/// The blur radius is `floor(font_size * blur_radius)` pixels and `opacity` scales the final
/// coverage.
pub fn render_shadow<R>(
    rasterizer: &R,
    text: &str,
    font_size: u32,
    blur_radius: f32,
    opacity: f32,
) -> ShadowMask
where
    R: ShadowRasterizer + ?Sized,
{
    let radius = (font_size as f32 * blur_radius).max(0.0).floor() as usize;
    let mut mask = rasterizer.rasterize(text, font_size).padded(radius);

    if radius > 0 {
        box_blur_horizontal(&mut mask, radius);
        box_blur_vertical(&mut mask, radius);
    }

    let opacity = opacity.clamp(0.0, 1.0);
    if opacity < 1.0 {
        for px in &mut mask.data {
            *px = (*px as f32 * opacity).round() as u8;
        }
    }

    ShadowMask { mask, radius }
}

fn box_blur_horizontal(mask: &mut AlphaMask, radius: usize) {
    let window = (radius * 2 + 1) as u32;
    let mut row = vec![0u8; mask.width];
    for y in 0..mask.height {
        let line = &mask.data[y * mask.width..(y + 1) * mask.width];
        for (x, out) in row.iter_mut().enumerate() {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius).min(mask.width - 1);
            let sum: u32 = line[lo..=hi].iter().map(|&v| v as u32).sum();
            *out = (sum / window) as u8;
        }
        mask.data[y * mask.width..(y + 1) * mask.width].copy_from_slice(&row);
    }
}

fn box_blur_vertical(mask: &mut AlphaMask, radius: usize) {
    let window = (radius * 2 + 1) as u32;
    let mut col = vec![0u8; mask.height];
    for x in 0..mask.width {
        for (y, out) in col.iter_mut().enumerate() {
            let lo = y.saturating_sub(radius);
            let hi = (y + radius).min(mask.height - 1);
            let sum: u32 = (lo..=hi).map(|yy| mask.get(x, yy) as u32).sum();
            *out = (sum / window) as u8;
        }
        for (y, &v) in col.iter().enumerate() {
            mask.data[y * mask.width + x] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TextSize;

    /// Paints every character as a solid 4x4 block.
    struct BlockFont;

    impl TextMeasurer for BlockFont {
        fn font_id(&self) -> &str {
            "block"
        }

        fn measure(&self, text: &str, _font_size: u32, _stroke_width: u32) -> TextSize {
            TextSize {
                width: text.chars().count() as u32 * 4,
                height: 4,
            }
        }
    }

    impl ShadowRasterizer for BlockFont {
        fn rasterize(&self, text: &str, _font_size: u32) -> AlphaMask {
            let width = text.chars().count() * 4;
            AlphaMask {
                width,
                height: 4,
                data: vec![255; width * 4],
            }
        }
    }

    #[test]
    fn zero_blur_keeps_coverage() {
        let shadow = render_shadow(&BlockFont, "ab", 10, 0.0, 1.0);
        assert_eq!(shadow.radius, 0);
        assert_eq!(shadow.mask.width, 8);
        assert!(shadow.mask.data.iter().all(|&v| v == 255));
    }

    #[test]
    fn blur_pads_and_spreads_coverage() {
        let shadow = render_shadow(&BlockFont, "a", 10, 0.1, 1.0);
        assert_eq!(shadow.radius, 1);
        assert_eq!((shadow.mask.width, shadow.mask.height), (6, 6));
        // Corners of the padding pick up some coverage; the centre stays solid.
        assert!(shadow.mask.get(0, 0) > 0);
        assert!(shadow.mask.get(0, 0) < 255);
        assert_eq!(shadow.mask.get(2, 2), 255);
    }

    #[test]
    fn opacity_scales_coverage() {
        let shadow = render_shadow(&BlockFont, "a", 10, 0.0, 0.5);
        assert!(shadow.mask.data.iter().all(|&v| v == 128));
    }

    #[test]
    fn max_at_ignores_out_of_bounds() {
        let mut mask = AlphaMask::new(2, 2);
        mask.max_at(-1, 0, 200);
        mask.max_at(2, 1, 200);
        mask.max_at(1, 1, 200);
        mask.max_at(1, 1, 100);
        assert_eq!(mask.data, vec![0, 0, 0, 200]);
    }
}
