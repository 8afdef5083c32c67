/*!
 * Text measurement and word-wrapping for overlay text.
 *
 * Wrapping decisions are pixel-based: a `TextMeasurer` reports the rendered
 * width of a candidate line, and the wrapper greedily packs whole words into
 * lines that fit the budget. When no measurer is available for a font the
 * wrapper degrades to a conservative width estimate instead of failing.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

/// Conservative per-character width factor used when no font metrics exist
const ESTIMATE_ADVANCE_FACTOR: f32 = 0.65;

/// Upper bound on cached (font, size) metric entries
const METRICS_CACHE_CAP: usize = 64;

/// Capability for measuring rendered text width.
///
/// Implementations must fail gracefully: returning `None` signals that the
/// font could not be loaded, and callers fall back to an estimate.
pub trait TextMeasurer: Send + Sync {
    /// Pixel width of `text` rendered with the given font and size
    fn measure(&self, font: &Path, size_px: u32, text: &str) -> Option<f32>;
}

/// Estimated width for fonts without metrics: `chars × size × 0.65`
pub fn estimate_width(text: &str, size_px: u32) -> f32 {
    text.chars().count() as f32 * size_px as f32 * ESTIMATE_ADVANCE_FACTOR
}

/// Word-wraps text against a pixel width budget.
#[derive(Clone)]
pub struct TextWrapper {
    measurer: Option<Arc<dyn TextMeasurer>>,
}

impl TextWrapper {
    /// Create a wrapper backed by a measurer
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        TextWrapper {
            measurer: Some(measurer),
        }
    }

    /// Create a wrapper that always uses the width estimate
    pub fn without_measurer() -> Self {
        TextWrapper { measurer: None }
    }

    /// Width of `text`, measured if possible, estimated otherwise
    pub fn width_of(&self, text: &str, font: &Path, size_px: u32) -> f32 {
        self.measurer
            .as_ref()
            .and_then(|m| m.measure(font, size_px, text))
            .unwrap_or_else(|| estimate_width(text, size_px))
    }

    /// Insert line breaks so that no line's width exceeds `budget_px` and no
    /// word is split across a break.
    ///
    /// A single word wider than the budget is emitted on its own line; the
    /// wrapper guarantees progress rather than a fit in that case.
    pub fn wrap(&self, text: &str, font: &Path, size_px: u32, budget_px: f32) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for word in text.split_whitespace() {
            current.push(word);
            let candidate = current.join(" ");

            if self.width_of(&candidate, font, size_px) > budget_px {
                // Move the word that overflowed onto a fresh line, unless it
                // is alone on the line already
                current.pop();
                if !current.is_empty() {
                    lines.push(current.join(" "));
                }
                current = vec![word];
            }
        }

        if !current.is_empty() {
            lines.push(current.join(" "));
        }

        lines.join("\n")
    }
}

impl std::fmt::Debug for TextWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextWrapper")
            .field("has_measurer", &self.measurer.is_some())
            .finish()
    }
}

/// A measurer with a fixed advance width per character, expressed in ems.
///
/// The per-(font, size) pixel advance is kept in a bounded cache owned by
/// the measurer, mirroring how a glyph-backed implementation would hold
/// loaded font handles.
#[derive(Debug)]
pub struct FixedAdvanceMeasurer {
    advance_em: f32,
    cache: Mutex<HashMap<(PathBuf, u32), f32>>,
}

impl FixedAdvanceMeasurer {
    /// Create a measurer with the given advance factor (width per em)
    pub fn new(advance_em: f32) -> Self {
        FixedAdvanceMeasurer {
            advance_em,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn advance_px(&self, font: &Path, size_px: u32) -> f32 {
        let key = (font.to_path_buf(), size_px);
        let mut cache = self.cache.lock();

        if let Some(advance) = cache.get(&key) {
            return *advance;
        }

        let advance = self.advance_em * size_px as f32;
        if cache.len() >= METRICS_CACHE_CAP {
            debug!("Font metrics cache full, clearing {} entries", cache.len());
            cache.clear();
        }
        cache.insert(key, advance);
        advance
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, font: &Path, size_px: u32, text: &str) -> Option<f32> {
        let advance = self.advance_px(font, size_px);
        Some(text.chars().count() as f32 * advance)
    }
}
