//! Bitmap font metrics
//!
//! A bitmap font is a tile sheet plus an ordered character map: the n-th
//! character of the map is drawn from the n-th tile, counting left to right
//! and top to bottom. The sheet is prepared once per settings snapshot:
//!
//! - color-key removal: a pixel whose RGB is within `color_key_tolerance` of
//!   the key on every channel (per-channel max distance) becomes transparent
//! - tint: every remaining opaque pixel takes the tint RGB, keeping its alpha
//!
//! With pixel scanning enabled each glyph is measured from its first to its
//! last inked column; otherwise every glyph is a full tile wide.

use std::collections::HashMap;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use super::GlyphMetrics;
use crate::color::Color;
use crate::settings::BitmapFontSettings;

/// Columns of a tile that contain ink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkSpan {
    /// First inked column, relative to the tile
    pub left: u32,
    pub width: u32,
}

/// A prepared tile sheet
#[derive(Debug, Clone)]
pub struct BitmapSheet {
    pixels: RgbaImage,
    tile_width: u32,
    tile_height: u32,
    separation_x: u32,
    separation_y: u32,
    tiles_per_row: u32,
    index: HashMap<char, usize>,
}

impl BitmapSheet {
    pub fn new(image: &RgbaImage, font: &BitmapFontSettings) -> Self {
        let tile_width = font.tile_width.max(1);
        let tile_height = font.tile_height.max(1);
        let stride = tile_width.saturating_add(font.separation_x);
        let tiles_per_row = (image.width().saturating_add(font.separation_x) / stride).max(1);

        let mut index = HashMap::new();
        for (i, ch) in font.char_map.chars().enumerate() {
            // First occurrence wins for duplicated map entries
            index.entry(ch).or_insert(i);
        }

        Self {
            pixels: prepare_pixels(
                image,
                font.color_key,
                font.color_key_tolerance,
                font.tint_color,
            ),
            tile_width,
            tile_height,
            separation_x: font.separation_x,
            separation_y: font.separation_y,
            tiles_per_row,
            index,
        }
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn tile_index(&self, ch: char) -> Option<usize> {
        self.index.get(&ch).copied()
    }

    /// Top-left pixel of a tile, or `None` if the tile is outside the sheet
    pub fn tile_origin(&self, index: usize) -> Option<(u32, u32)> {
        let index = u64::try_from(index).ok()?;
        let per_row = u64::from(self.tiles_per_row);
        let x = (index % per_row) * (u64::from(self.tile_width) + u64::from(self.separation_x));
        let y = (index / per_row)
            .checked_mul(u64::from(self.tile_height) + u64::from(self.separation_y))?;
        let fits = x + u64::from(self.tile_width) <= u64::from(self.pixels.width())
            && y.checked_add(u64::from(self.tile_height))? <= u64::from(self.pixels.height());
        // Both coordinates are inside the sheet, so they fit in u32
        fits.then_some((x as u32, y as u32))
    }

    /// Pixel of a tile in tile-relative coordinates
    pub fn tile_pixel(&self, origin: (u32, u32), x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(origin.0 + x, origin.1 + y)
    }

    /// Scan a tile column by column for ink
    pub fn ink_span(&self, origin: (u32, u32)) -> Option<InkSpan> {
        let inked = |x: u32| (0..self.tile_height).any(|y| self.tile_pixel(origin, x, y)[3] > 0);
        let left = (0..self.tile_width).find(|&x| inked(x))?;
        let right = (0..self.tile_width).rev().find(|&x| inked(x))?;
        Some(InkSpan {
            left,
            width: right - left + 1,
        })
    }
}

/// Apply color-key removal and tint to a copy of the sheet
fn prepare_pixels(
    image: &RgbaImage,
    color_key: Option<Color>,
    tolerance: u8,
    tint: Option<Color>,
) -> RgbaImage {
    let mut pixels = image.clone();
    if color_key.is_none() && tint.is_none() {
        return pixels;
    }

    for pixel in pixels.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if let Some(key) = color_key {
            if Color::rgb(r, g, b).channel_distance(&key) <= tolerance {
                *pixel = Rgba([r, g, b, 0]);
                continue;
            }
        }
        if let Some(tint) = tint {
            if a > 0 {
                *pixel = Rgba([tint.r, tint.g, tint.b, a]);
            }
        }
    }

    pixels
}

/// Where to find a glyph on the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapGlyph {
    pub origin: (u32, u32),
    /// Columns drawn for this glyph, relative to the tile
    pub span: InkSpan,
}

/// Metrics for the bitmap font model
#[derive(Debug, Clone)]
pub struct BitmapFontMetrics {
    sheet: Option<Arc<BitmapSheet>>,
    glyphs: HashMap<char, BitmapGlyph>,
    tile_width: u32,
    tile_height: u32,
    zoom: f32,
    spacing: f32,
    space_width_override: f32,
    pixel_scanning: bool,
}

impl BitmapFontMetrics {
    pub fn new(sheet: Arc<BitmapSheet>, font: &BitmapFontSettings) -> Self {
        let full_tile = InkSpan {
            left: 0,
            width: sheet.tile_width(),
        };
        let mut glyphs = HashMap::new();
        for ch in font.char_map.chars() {
            if glyphs.contains_key(&ch) {
                continue;
            }
            let Some(origin) = sheet.tile_index(ch).and_then(|i| sheet.tile_origin(i)) else {
                tracing::trace!("Character {:?} maps outside the tile sheet", ch);
                continue;
            };
            let span = if font.pixel_scanning {
                sheet.ink_span(origin).unwrap_or(InkSpan { left: 0, width: 0 })
            } else {
                full_tile
            };
            glyphs.insert(ch, BitmapGlyph { origin, span });
        }
        tracing::debug!("Prepared bitmap font with {} glyphs", glyphs.len());

        Self {
            sheet: Some(sheet),
            glyphs,
            ..Self::placeholder(font)
        }
    }

    /// Fixed-width metrics used until the sheet image is available
    pub fn placeholder(font: &BitmapFontSettings) -> Self {
        Self {
            sheet: None,
            glyphs: HashMap::new(),
            tile_width: font.tile_width.max(1),
            tile_height: font.tile_height.max(1),
            zoom: font.zoom,
            spacing: font.spacing,
            space_width_override: font.space_width_override,
            pixel_scanning: font.pixel_scanning,
        }
    }

    pub fn sheet(&self) -> Option<&Arc<BitmapSheet>> {
        self.sheet.as_ref()
    }

    pub fn glyph(&self, ch: char) -> Option<&BitmapGlyph> {
        self.glyphs.get(&ch)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }
}

impl GlyphMetrics for BitmapFontMetrics {
    fn char_width(&self, ch: char) -> f32 {
        if self.sheet.is_none() {
            return self.tile_width as f32 * self.zoom;
        }
        self.glyphs
            .get(&ch)
            .map_or(0.0, |g| g.span.width as f32 * self.zoom)
    }

    fn space_width(&self) -> f32 {
        let source_px = if self.space_width_override > 0.0 {
            self.space_width_override
        } else if self.pixel_scanning {
            self.tile_width as f32 / 4.0
        } else {
            self.tile_width as f32
        };
        source_px * self.zoom
    }

    fn line_height(&self) -> f32 {
        self.tile_height as f32 * self.zoom
    }

    fn letter_spacing(&self) -> f32 {
        self.spacing * self.zoom
    }
}
