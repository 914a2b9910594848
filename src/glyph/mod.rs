//! Glyph metrics providers
//!
//! Layout only needs to know how wide and tall each token is. Two font
//! models answer that question behind the [`GlyphMetrics`] trait:
//!
//! - [`SystemFontMetrics`]: asks a [`TextMeasurer`] (the host's text
//!   measurement; `fontdue` in this build)
//! - [`BitmapFontMetrics`]: scans a tile sheet for per-glyph ink widths
//!
//! When a font resource has not been loaded yet, both fall back to a
//! fixed-width placeholder so the preview never goes blank.

pub mod bitmap;
pub mod system;

pub use bitmap::{BitmapFontMetrics, BitmapGlyph, BitmapSheet, InkSpan};
pub use system::{FontdueMeasurer, PlaceholderMeasurer, SystemFontMetrics, TextMeasurer};

use crate::resource::FontResources;
use crate::settings::{AppSettings, FontModel};
use crate::tags::Token;

/// Tabs advance by this many spaces
pub const TAB_WIDTH: usize = 4;

/// Size of a token in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphSize {
    pub width: f32,
    pub height: f32,
}

impl GlyphSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Measurement capability shared by every font model
pub trait GlyphMetrics {
    /// Advance width of a non-space character
    fn char_width(&self, ch: char) -> f32;

    fn space_width(&self) -> f32;

    /// Height of one line of text, before the line-height factor
    fn line_height(&self) -> f32;

    /// Extra advance added after every glyph
    fn letter_spacing(&self) -> f32 {
        0.0
    }

    fn measure(&self, token: &Token) -> GlyphSize {
        match *token {
            Token::Text { ch: ' ', .. } => GlyphSize::new(self.space_width(), self.line_height()),
            Token::Text { ch: '\t', .. } => {
                GlyphSize::new(self.space_width() * TAB_WIDTH as f32, self.line_height())
            }
            Token::Text { ch, .. } => GlyphSize::new(self.char_width(ch), self.line_height()),
            Token::Image { width, height, .. } => GlyphSize::new(width, height),
            Token::LineBreak => GlyphSize::new(0.0, self.line_height()),
        }
    }
}

/// The metrics provider for the active font model
#[derive(Debug, Clone)]
pub enum ActiveFont {
    System(SystemFontMetrics),
    Bitmap(BitmapFontMetrics),
}

impl ActiveFont {
    /// Build the provider for the settings' font model from loaded resources
    pub fn from_settings(settings: &AppSettings, resources: &FontResources) -> Self {
        match settings.font_model() {
            FontModel::System(font) => match resources.face(&font.family, font.weight) {
                Some(measurer) => ActiveFont::System(SystemFontMetrics::new(measurer, font)),
                None => {
                    tracing::debug!(
                        "Font '{}' not loaded, using placeholder metrics",
                        font.family
                    );
                    ActiveFont::System(SystemFontMetrics::placeholder(font))
                }
            },
            FontModel::Bitmap(font) => match resources.bitmap_image() {
                Some(image) => {
                    let sheet = BitmapSheet::new(image, font);
                    ActiveFont::Bitmap(BitmapFontMetrics::new(sheet.into(), font))
                }
                None => {
                    tracing::debug!("Bitmap font sheet not loaded, using placeholder metrics");
                    ActiveFont::Bitmap(BitmapFontMetrics::placeholder(font))
                }
            },
        }
    }

    /// True while the font resource is missing and placeholder metrics are used
    pub fn is_placeholder(&self) -> bool {
        match self {
            ActiveFont::System(metrics) => metrics.is_placeholder(),
            ActiveFont::Bitmap(metrics) => metrics.sheet().is_none(),
        }
    }
}

impl GlyphMetrics for ActiveFont {
    fn char_width(&self, ch: char) -> f32 {
        match self {
            ActiveFont::System(m) => m.char_width(ch),
            ActiveFont::Bitmap(m) => m.char_width(ch),
        }
    }

    fn space_width(&self) -> f32 {
        match self {
            ActiveFont::System(m) => m.space_width(),
            ActiveFont::Bitmap(m) => m.space_width(),
        }
    }

    fn line_height(&self) -> f32 {
        match self {
            ActiveFont::System(m) => m.line_height(),
            ActiveFont::Bitmap(m) => m.line_height(),
        }
    }

    fn letter_spacing(&self) -> f32 {
        match self {
            ActiveFont::System(m) => m.letter_spacing(),
            ActiveFont::Bitmap(m) => m.letter_spacing(),
        }
    }
}
