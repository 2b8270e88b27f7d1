//! Text measurement seam and the memoisation tables built on top of it.
//!
//! Measuring text with real glyph metrics (and rendering blurred shadows) is the expensive
//! part of laying out captions, and the same inputs recur constantly: every highlighted word
//! of a caption re-lays out the same caption text. We memoise both results keyed by the exact
//! arguments that determine them.
//!
//! The tables are bounded LRUs owned by whoever constructs a `MetricsCache` (normally the
//! caption scheduler); nothing here is process-global.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

use crate::shadow::{ShadowMask, ShadowRasterizer, render_shadow};
use crate::wrapper::LineLayout;

/// Rendered size of a single line of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSize {
    pub width: u32,
    pub height: u32,
}

/// Measures rendered text.
///
/// Implementations must be pure: the same `(text, font_size, stroke_width)` must always
/// produce the same size for a given `font_id`, since results are cached under that key.
pub trait TextMeasurer {
    /// Stable identity of the underlying font (typically its resolved path).
    fn font_id(&self) -> &str;

    fn measure(&self, text: &str, font_size: u32, stroke_width: u32) -> TextSize;
}

/// Key for a wrapped line layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    pub text: String,
    pub font: String,
    pub font_size: u32,
    pub stroke_width: u32,
    pub max_width: u32,
}

/// Key for a rendered shadow. Float parameters are keyed by their bit patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShadowKey {
    pub text: String,
    pub font: String,
    pub font_size: u32,
    blur_radius: u32,
    opacity: u32,
}

impl ShadowKey {
    pub fn new(
        text: impl Into<String>,
        font: impl Into<String>,
        font_size: u32,
        blur_radius: f32,
        opacity: f32,
    ) -> Self {
        Self {
            text: text.into(),
            font: font.into(),
            font_size,
            blur_radius: blur_radius.to_bits(),
            opacity: opacity.to_bits(),
        }
    }

    pub fn blur_radius(&self) -> f32 {
        f32::from_bits(self.blur_radius)
    }

    pub fn opacity(&self) -> f32 {
        f32::from_bits(self.opacity)
    }
}

/// Hit/miss counters for one cache table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Counters {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Bounded memoisation tables for line layouts and shadow masks.
///
/// Entries are handed out as `Arc`s so cached products are shared, never copied or mutated.
/// Each table sits behind its own mutex; the compute step runs outside the lock, so two
/// threads racing on the same key may both compute it, and both get an identical value.
pub struct MetricsCache {
    lines: Mutex<LruCache<LayoutKey, Arc<LineLayout>>>,
    shadows: Mutex<LruCache<ShadowKey, Arc<ShadowMask>>>,
    line_counters: Counters,
    shadow_counters: Counters,
}

impl MetricsCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            lines: Mutex::new(LruCache::new(capacity)),
            shadows: Mutex::new(LruCache::new(capacity)),
            line_counters: Counters::default(),
            shadow_counters: Counters::default(),
        }
    }

    /// Fetch the layout for `key`, computing and storing it on a miss.
    pub fn layout(&self, key: LayoutKey, compute: impl FnOnce() -> LineLayout) -> Arc<LineLayout> {
        if let Some(hit) = self.lines.lock().get(&key) {
            self.line_counters.hit();
            return Arc::clone(hit);
        }

        self.line_counters.miss();
        tracing::debug!(text = %key.text, max_width = key.max_width, "line layout cache miss");
        let layout = Arc::new(compute());
        self.lines.lock().put(key, Arc::clone(&layout));
        layout
    }

    /// Fetch (or render) the shadow described by `key` using `rasterizer`.
    pub fn shadow<R>(&self, rasterizer: &R, key: ShadowKey) -> Arc<ShadowMask>
    where
        R: ShadowRasterizer + ?Sized,
    {
        if let Some(hit) = self.shadows.lock().get(&key) {
            self.shadow_counters.hit();
            return Arc::clone(hit);
        }

        self.shadow_counters.miss();
        tracing::debug!(text = %key.text, "shadow cache miss");
        let shadow = Arc::new(render_shadow(
            rasterizer,
            &key.text,
            key.font_size,
            key.blur_radius(),
            key.opacity(),
        ));
        self.shadows.lock().put(key, Arc::clone(&shadow));
        shadow
    }

    pub fn layout_stats(&self) -> CacheStats {
        self.line_counters.snapshot()
    }

    pub fn shadow_stats(&self) -> CacheStats {
        self.shadow_counters.snapshot()
    }

    /// Number of layouts currently retained.
    pub fn layout_len(&self) -> usize {
        self.lines.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow::AlphaMask;
    use crate::wrapper::LineBlock;

    fn key(text: &str) -> LayoutKey {
        LayoutKey {
            text: text.to_owned(),
            font: "mono".to_owned(),
            font_size: 10,
            stroke_width: 0,
            max_width: 100,
        }
    }

    fn layout(text: &str) -> LineLayout {
        LineLayout {
            lines: vec![LineBlock {
                text: text.to_owned(),
                width: 50,
                height: 20,
            }],
            total_height: 20,
        }
    }

    #[test]
    fn second_lookup_is_a_hit_and_skips_compute() {
        let cache = MetricsCache::new(NonZeroUsize::new(8).unwrap());
        let first = cache.layout(key("hello"), || layout("hello"));
        let second = cache.layout(key("hello"), || panic!("should not recompute"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.layout_stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn capacity_bounds_the_table() {
        let cache = MetricsCache::new(NonZeroUsize::new(2).unwrap());
        cache.layout(key("a"), || layout("a"));
        cache.layout(key("b"), || layout("b"));
        cache.layout(key("c"), || layout("c"));
        assert_eq!(cache.layout_len(), 2);

        // "a" was least recently used and has been evicted.
        let mut recomputed = false;
        cache.layout(key("a"), || {
            recomputed = true;
            layout("a")
        });
        assert!(recomputed);
    }

    struct Solid;

    impl TextMeasurer for Solid {
        fn font_id(&self) -> &str {
            "solid"
        }

        fn measure(&self, text: &str, _font_size: u32, _stroke_width: u32) -> TextSize {
            TextSize {
                width: text.len() as u32,
                height: 1,
            }
        }
    }

    impl ShadowRasterizer for Solid {
        fn rasterize(&self, text: &str, _font_size: u32) -> AlphaMask {
            AlphaMask {
                width: text.len(),
                height: 1,
                data: vec![255; text.len()],
            }
        }
    }

    #[test]
    fn shadows_are_keyed_by_every_parameter() {
        let cache = MetricsCache::new(NonZeroUsize::new(8).unwrap());
        let a = cache.shadow(&Solid, ShadowKey::new("hi", "solid", 10, 0.0, 1.0));
        let b = cache.shadow(&Solid, ShadowKey::new("hi", "solid", 10, 0.0, 1.0));
        let c = cache.shadow(&Solid, ShadowKey::new("hi", "solid", 10, 0.0, 0.5));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.shadow_stats(), CacheStats { hits: 1, misses: 2 });
    }
}
