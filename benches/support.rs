//! Shared helpers for benchmarks

use std::sync::Arc;

use boxfit::glyph::{ActiveFont, SystemFontMetrics, TextMeasurer};
use boxfit::preview::PreviewEngine;
use boxfit::settings::AppSettings;

#[derive(Debug)]
pub struct FixedMeasurer;

impl TextMeasurer for FixedMeasurer {
    fn advance(&self, ch: char, size: f32) -> f32 {
        // Narrow and wide glyphs so wrapping is not uniform
        if ch.is_ascii_lowercase() {
            size * 0.5
        } else {
            size * 0.7
        }
    }

    fn line_height(&self, size: f32) -> f32 {
        size * 1.2
    }
}

#[allow(dead_code)]
pub fn fixed_font(settings: &AppSettings) -> ActiveFont {
    ActiveFont::System(SystemFontMetrics::new(
        Arc::new(FixedMeasurer),
        &settings.system_font,
    ))
}

#[allow(dead_code)]
pub fn make_engine(settings: AppSettings) -> PreviewEngine {
    let font = fixed_font(&settings);
    PreviewEngine::with_font(Arc::new(settings), font)
}

/// A script of `blocks` dialogue blocks separated by blank lines
#[allow(dead_code)]
pub fn make_script(blocks: usize) -> String {
    let lines = [
        "[NAME]: The gate to the northern pass is sealed.",
        "Bring me the <red>silver key</red> and I will open it.",
        "Until then, rest here{wait:20} traveler.",
    ];
    (0..blocks)
        .map(|i| lines[..=(i % lines.len())].join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}
