//! Rasterize a block preview into an image of the configured box
//!
//! Drawing order: background, overflowing-line highlights, margin guides,
//! glyphs, then a red border when the block overflows.

pub mod canvas;

pub use canvas::{blend_colors, Canvas};

use image::RgbaImage;

use crate::color::Color;
use crate::glyph::{ActiveFont, BitmapFontMetrics, SystemFontMetrics};
use crate::layout::{PositionedGlyph, Rect};
use crate::overflow::BoxGeometry;
use crate::preview::{BlockPreview, PreviewEngine};
use crate::resource::FontResources;
use crate::settings::{AppSettings, Margins};
use crate::tags::Token;

/// Largest canvas side in pixels
pub const MAX_CANVAS_SIDE: f32 = 8192.0;

const OVERFLOW_BORDER: u32 = 0xFFFF3030;
const OVERFLOW_LINE: u32 = 0x40FF0000;
const GUIDE_WRAP: u32 = 0x8000FFFF;
const GUIDE_HARD: u32 = 0x80FF4040;
const PLACEHOLDER_ALPHA: u8 = 0x90;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub scale: f32,
    pub show_margins: bool,
    pub highlight_overflow: bool,
}

impl RenderOptions {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            scale: settings.preview_scale,
            show_margins: settings.enable_margins,
            highlight_overflow: true,
        }
    }
}

struct Painter<'a> {
    canvas: Canvas,
    scale: f32,
    font: &'a ActiveFont,
    resources: &'a FontResources,
    text_color: Color,
}

/// Render one block preview
pub fn render_block(
    preview: &BlockPreview,
    engine: &PreviewEngine,
    resources: &FontResources,
    options: &RenderOptions,
) -> RgbaImage {
    let settings = engine.settings();
    let geometry = engine.geometry();
    let scale = options.scale;
    let layout = &preview.layout;

    let box_width = if geometry.width > 0.0 {
        geometry.width
    } else {
        layout.bounds.right()
    };
    let box_height = if geometry.height > 0.0 {
        geometry.height
    } else {
        layout.bounds.bottom()
    };
    let side = |v: f32| (v * scale).ceil().clamp(1.0, MAX_CANVAS_SIDE) as usize;

    let mut painter = Painter {
        canvas: Canvas::new(
            side(box_width),
            side(box_height),
            settings.background_color.to_argb_u32(),
        ),
        scale,
        font: engine.font(),
        resources,
        text_color: settings.system_font.color,
    };

    if options.highlight_overflow {
        for &index in &preview.overflow.lines {
            if let Some(line) = layout.lines.get(index) {
                let rect = Rect::new(line.x, line.y, line.width.max(1.0), line.height);
                painter.canvas.blend_rect(painter.scaled(rect), OVERFLOW_LINE);
            }
        }
    }

    if options.show_margins {
        if let Some(margins) = geometry.margins {
            painter.draw_guides(geometry, &margins);
        }
    }

    for line in &layout.lines {
        for glyph in &line.glyphs {
            painter.draw_glyph(glyph);
        }
    }

    if options.highlight_overflow && preview.overflow.overflowing {
        let full = Rect::new(
            0.0,
            0.0,
            painter.canvas.width() as f32,
            painter.canvas.height() as f32,
        );
        painter.canvas.stroke_rect(full, OVERFLOW_BORDER);
    }

    painter.canvas.into_image()
}

impl Painter<'_> {
    fn scaled(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x * self.scale,
            rect.y * self.scale,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }

    fn draw_guides(&mut self, geometry: &BoxGeometry, margins: &Margins) {
        let color = |break_line: bool| if break_line { GUIDE_WRAP } else { GUIDE_HARD };
        if geometry.width > 0.0 {
            if margins.left.value > 0.0 {
                self.canvas
                    .guide_vertical(margins.left.value * self.scale, color(margins.left.break_line));
            }
            if margins.right.value > 0.0 {
                self.canvas.guide_vertical(
                    (geometry.width - margins.right.value) * self.scale,
                    color(margins.right.break_line),
                );
            }
        }
        if geometry.height > 0.0 {
            if margins.top.value > 0.0 {
                self.canvas
                    .guide_horizontal(margins.top.value * self.scale, color(margins.top.break_line));
            }
            if margins.bottom.value > 0.0 {
                self.canvas.guide_horizontal(
                    (geometry.height - margins.bottom.value) * self.scale,
                    color(margins.bottom.break_line),
                );
            }
        }
    }

    fn draw_glyph(&mut self, glyph: &PositionedGlyph) {
        let cell = Rect::new(glyph.x, glyph.y, glyph.width, glyph.height);
        let (font, resources) = (self.font, self.resources);
        match glyph.token {
            Token::Text { ch, .. } if ch.is_whitespace() => {}
            Token::Text { ch, color } => match font {
                ActiveFont::System(metrics) => {
                    let color = color.unwrap_or(self.text_color);
                    self.draw_system_char(metrics, ch, cell, color);
                }
                ActiveFont::Bitmap(metrics) => self.draw_bitmap_char(metrics, ch, cell, color),
            },
            Token::Image { tag, .. } => {
                let dest = self.scaled(cell);
                match resources.tag_image(tag) {
                    Some(image) => self.canvas.blit_scaled(image, dest),
                    None => {
                        self.canvas
                            .blend_rect(dest, self.text_color.with_alpha(0x40).to_argb_u32());
                        self.canvas
                            .stroke_rect(dest, self.text_color.to_argb_u32());
                    }
                }
            }
            Token::LineBreak => {}
        }
    }

    /// Box drawn in place of a glyph whose font is not loaded
    fn draw_placeholder(&mut self, cell: Rect, color: Color) {
        let inset_x = cell.width * 0.15;
        let inset_y = cell.height * 0.2;
        let rect = Rect::new(
            cell.x + inset_x,
            cell.y + inset_y,
            cell.width - 2.0 * inset_x,
            cell.height - 2.0 * inset_y,
        );
        let rect = self.scaled(rect);
        self.canvas
            .blend_rect(rect, color.with_alpha(PLACEHOLDER_ALPHA).to_argb_u32());
    }

    fn draw_system_char(&mut self, metrics: &SystemFontMetrics, ch: char, cell: Rect, color: Color) {
        let Some(font) = metrics.measurer().font() else {
            self.draw_placeholder(cell, color);
            return;
        };
        let size = metrics.size() * self.scale;
        let (glyph_metrics, coverage) = font.rasterize(ch, size);
        let baseline = (cell.y + metrics.ascent()) * self.scale;
        let glyph_top = baseline - glyph_metrics.height as f32 - glyph_metrics.ymin as f32;
        let left = (cell.x * self.scale) as isize + glyph_metrics.xmin as isize;
        self.canvas.draw_coverage(
            &coverage,
            glyph_metrics.width,
            left,
            glyph_top.round() as isize,
            color.to_argb_u32(),
        );
    }

    fn draw_bitmap_char(
        &mut self,
        metrics: &BitmapFontMetrics,
        ch: char,
        cell: Rect,
        color: Option<Color>,
    ) {
        let Some(sheet) = metrics.sheet() else {
            self.draw_placeholder(cell, color.unwrap_or(self.text_color));
            return;
        };
        // Unmapped characters are skipped
        let Some(glyph) = metrics.glyph(ch) else {
            return;
        };

        let zoom = metrics.zoom();
        let pixel = zoom * self.scale;
        for sy in 0..sheet.tile_height() {
            for sx in 0..glyph.span.width {
                let [r, g, b, a] = sheet.tile_pixel(glyph.origin, glyph.span.left + sx, sy).0;
                if a == 0 {
                    continue;
                }
                let rgb = color.unwrap_or(Color::rgb(r, g, b));
                let rect = Rect::new(
                    (cell.x + sx as f32 * zoom) * self.scale,
                    (cell.y + sy as f32 * zoom) * self.scale,
                    pixel,
                    pixel,
                );
                self.canvas.blend_rect(rect, rgb.with_alpha(a).to_argb_u32());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_canvas_matches_box_and_scale() {
        let settings = AppSettings {
            preview_width: 40.0,
            preview_height: 10.0,
            preview_scale: 2.0,
            ..AppSettings::default()
        };
        let resources = FontResources::default();
        let engine = PreviewEngine::new(Arc::new(settings.clone()), &resources);
        let preview = engine.preview_text("hi", None);
        let image = render_block(
            &preview,
            &engine,
            &resources,
            &RenderOptions::from_settings(&settings),
        );
        assert_eq!(image.dimensions(), (80, 20));
    }

    #[test]
    fn test_overflow_draws_border() {
        let settings = AppSettings {
            preview_width: 10.0,
            preview_height: 10.0,
            ..AppSettings::default()
        };
        let resources = FontResources::default();
        let engine = PreviewEngine::new(Arc::new(settings.clone()), &resources);
        let preview = engine.preview_text("overflowing text", None);
        assert!(preview.overflow.overflowing);
        let image = render_block(
            &preview,
            &engine,
            &resources,
            &RenderOptions::from_settings(&settings),
        );
        assert_eq!(image.get_pixel(0, 0).0, [0xFF, 0x30, 0x30, 0xFF]);
    }
}
