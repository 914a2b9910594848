//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use boxfit::glyph::{ActiveFont, SystemFontMetrics, TextMeasurer};
use boxfit::messages::{Msg, ResourceMsg, ScriptMsg};
use boxfit::model::AppModel;
use boxfit::preview::PreviewEngine;
use boxfit::resource::FontResources;
use boxfit::settings::{AppSettings, BitmapFontSettings};
use boxfit::update::update;

/// Every glyph is `advance` wide and every line `line_height` tall
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasurer {
    pub advance: f32,
    pub line_height: f32,
}

impl TextMeasurer for FixedMeasurer {
    fn advance(&self, _ch: char, _size: f32) -> f32 {
        self.advance
    }

    fn line_height(&self, _size: f32) -> f32 {
        self.line_height
    }
}

/// Default settings with the given box size
pub fn box_settings(width: f32, height: f32) -> AppSettings {
    AppSettings {
        preview_width: width,
        preview_height: height,
        ..AppSettings::default()
    }
}

/// Resources whose only face is a fixed-width measurer for the settings' family
pub fn fixed_resources(settings: &AppSettings, advance: f32, line_height: f32) -> FontResources {
    let mut resources = FontResources::default();
    resources.add_face(
        &settings.system_font.family,
        settings.system_font.weight,
        Arc::new(FixedMeasurer {
            advance,
            line_height,
        }),
    );
    resources
}

/// Engine with 10px wide glyphs and 10px lines
pub fn test_engine(settings: AppSettings) -> PreviewEngine {
    fixed_engine(settings, 10.0, 10.0)
}

pub fn fixed_engine(settings: AppSettings, advance: f32, line_height: f32) -> PreviewEngine {
    let font = ActiveFont::System(SystemFontMetrics::new(
        Arc::new(FixedMeasurer {
            advance,
            line_height,
        }),
        &settings.system_font,
    ));
    PreviewEngine::with_font(Arc::new(settings), font)
}

/// Model with fixed-width resources loaded and `text` as the script
pub fn test_model(settings: AppSettings, text: &str) -> AppModel {
    let resources = fixed_resources(&settings, 10.0, 10.0);
    let mut model = AppModel::new(settings);
    update(
        &mut model,
        Msg::Resource(ResourceMsg::Loaded(Box::new(resources))),
    );
    update(
        &mut model,
        Msg::Script(ScriptMsg::Load {
            name: "test.txt".to_string(),
            text: text.to_string(),
        }),
    );
    model
}

/// A one-row tile sheet; tile `n` is inked in columns `inks[n].0 .. inks[n].0 + inks[n].1`
pub fn glyph_sheet(tile_width: u32, tile_height: u32, inks: &[(u32, u32)]) -> RgbaImage {
    glyph_sheet_on(
        tile_width,
        tile_height,
        inks,
        Rgba([0, 0, 0, 0]),
        Rgba([255, 255, 255, 255]),
    )
}

/// Like [`glyph_sheet`] with an explicit background and ink color
pub fn glyph_sheet_on(
    tile_width: u32,
    tile_height: u32,
    inks: &[(u32, u32)],
    background: Rgba<u8>,
    ink: Rgba<u8>,
) -> RgbaImage {
    let count = inks.len().max(1) as u32;
    let mut image = RgbaImage::from_pixel(tile_width * count, tile_height, background);
    for (tile, &(left, width)) in inks.iter().enumerate() {
        let origin = tile as u32 * tile_width;
        for x in left..(left + width).min(tile_width) {
            for y in 0..tile_height {
                image.put_pixel(origin + x, y, ink);
            }
        }
    }
    image
}

/// Bitmap font settings with pixel scanning on
pub fn scanning_font(tile_width: u32, tile_height: u32, char_map: &str) -> BitmapFontSettings {
    BitmapFontSettings {
        tile_width,
        tile_height,
        char_map: char_map.to_string(),
        pixel_scanning: true,
        ..BitmapFontSettings::default()
    }
}
