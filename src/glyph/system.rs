//! System font metrics
//!
//! The host measures text; this module only applies the preview's own
//! adjustments (space override, letter spacing) on top.

use std::sync::Arc;

use fontdue::{Font, FontSettings};

use super::GlyphMetrics;
use crate::resource::ResourceError;
use crate::settings::SystemFont;

/// Placeholder advance as a fraction of the font size
const PLACEHOLDER_ADVANCE: f32 = 0.6;
/// CSS `line-height: normal` approximation
const NORMAL_LINE_HEIGHT: f32 = 1.2;

/// Host text measurement
pub trait TextMeasurer: std::fmt::Debug + Send + Sync {
    /// Advance width of `ch` at `size` pixels
    fn advance(&self, ch: char, size: f32) -> f32;

    /// Distance between baselines at `size` pixels
    fn line_height(&self, size: f32) -> f32;

    /// Distance from the top of a line to its baseline
    fn ascent(&self, size: f32) -> f32 {
        size * 0.8
    }

    /// Face to rasterize with, when the measurer has one
    fn font(&self) -> Option<&Font> {
        None
    }
}

/// Fixed-width stand-in used until a font face is loaded
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderMeasurer;

impl TextMeasurer for PlaceholderMeasurer {
    fn advance(&self, _ch: char, size: f32) -> f32 {
        size * PLACEHOLDER_ADVANCE
    }

    fn line_height(&self, size: f32) -> f32 {
        size
    }
}

/// Measures with a TrueType/OpenType face through `fontdue`
pub struct FontdueMeasurer {
    font: Font,
}

impl std::fmt::Debug for FontdueMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueMeasurer")
            .field("name", &self.font.name())
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl FontdueMeasurer {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ResourceError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| ResourceError::FontFace(e.to_string()))?;
        Ok(Self { font })
    }
}

impl TextMeasurer for FontdueMeasurer {
    fn advance(&self, ch: char, size: f32) -> f32 {
        self.font.metrics(ch, size).advance_width
    }

    fn line_height(&self, size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * NORMAL_LINE_HEIGHT)
    }

    fn ascent(&self, size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size)
            .map(|m| m.ascent)
            .unwrap_or(size * 0.8)
    }

    fn font(&self) -> Option<&Font> {
        Some(&self.font)
    }
}

/// Metrics for the system font model
#[derive(Debug, Clone)]
pub struct SystemFontMetrics {
    measurer: Arc<dyn TextMeasurer>,
    placeholder: bool,
    size: f32,
    letter_spacing: f32,
    space_width_override: f32,
}

impl SystemFontMetrics {
    pub fn new(measurer: Arc<dyn TextMeasurer>, font: &SystemFont) -> Self {
        Self {
            measurer,
            placeholder: false,
            size: font.size,
            letter_spacing: font.letter_spacing,
            space_width_override: font.space_width_override,
        }
    }

    pub fn placeholder(font: &SystemFont) -> Self {
        Self {
            placeholder: true,
            ..Self::new(Arc::new(PlaceholderMeasurer), font)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn measurer(&self) -> &Arc<dyn TextMeasurer> {
        &self.measurer
    }

    pub fn ascent(&self) -> f32 {
        self.measurer.ascent(self.size)
    }
}

impl GlyphMetrics for SystemFontMetrics {
    fn char_width(&self, ch: char) -> f32 {
        self.measurer.advance(ch, self.size)
    }

    fn space_width(&self) -> f32 {
        if self.space_width_override > 0.0 {
            self.space_width_override
        } else {
            self.measurer.advance(' ', self.size)
        }
    }

    fn line_height(&self) -> f32 {
        self.measurer.line_height(self.size)
    }

    fn letter_spacing(&self) -> f32 {
        self.letter_spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_fixed_width() {
        let font = SystemFont {
            size: 10.0,
            ..SystemFont::default()
        };
        let metrics = SystemFontMetrics::placeholder(&font);
        assert!(metrics.is_placeholder());
        assert_eq!(metrics.char_width('W'), 6.0);
        assert_eq!(metrics.char_width('i'), 6.0);
        assert_eq!(metrics.line_height(), 10.0);
    }

    #[test]
    fn test_space_override() {
        let font = SystemFont {
            size: 10.0,
            space_width_override: 3.0,
            ..SystemFont::default()
        };
        let metrics = SystemFontMetrics::placeholder(&font);
        assert_eq!(metrics.space_width(), 3.0);
    }

    #[test]
    fn test_invalid_font_bytes() {
        assert!(FontdueMeasurer::from_bytes(b"not a font").is_err());
    }
}
