//! Preview engine
//!
//! Compiles one settings snapshot (tag set, byte map, metrics provider, box
//! geometry) and runs the per-block pipeline:
//!
//! ```text
//! content -> strip separators -> tags -> layout -> overflow (+ byte budget)
//! ```
//!
//! Every call is a pure function of the snapshot and its arguments.
//! A settings change builds a new engine.

use std::sync::Arc;

use crate::budget::{self, BudgetReport, ByteMap};
use crate::glyph::ActiveFont;
use crate::layout::{layout_block, BlockLayout, LayoutParams};
use crate::overflow::{
    detect_characters, detect_pixel, line_char_counts, BoxGeometry, OverflowMode, OverflowReport,
};
use crate::resource::FontResources;
use crate::script::{strip_separators, Block, Script};
use crate::settings::AppSettings;
use crate::tags::{TagSet, Tokenized};

/// Everything computed for one block
#[derive(Debug, Clone, Default)]
pub struct BlockPreview {
    pub tokens: Tokenized,
    pub layout: BlockLayout,
    pub overflow: OverflowReport,
    /// Present when byte restriction is on and a reference block exists
    pub budget: Option<BudgetReport>,
}

#[derive(Debug, Clone)]
pub struct PreviewEngine {
    settings: Arc<AppSettings>,
    tags: TagSet,
    font: ActiveFont,
    byte_map: ByteMap,
    geometry: BoxGeometry,
    params: LayoutParams,
}

impl PreviewEngine {
    pub fn new(settings: Arc<AppSettings>, resources: &FontResources) -> Self {
        let font = ActiveFont::from_settings(&settings, resources);
        Self::with_font(settings, font)
    }

    /// Build with an explicit metrics provider
    pub fn with_font(settings: Arc<AppSettings>, font: ActiveFont) -> Self {
        let geometry = BoxGeometry::from_settings(&settings);
        let mut params = LayoutParams {
            line_height_factor: settings.global_line_height_factor,
            h_align: settings.font_model().align(),
            v_align: settings.vertical_align,
            wrap: settings.wrap_mode,
            ..LayoutParams::default()
        };
        geometry.apply_to(&mut params);

        tracing::debug!(
            "Preview engine built: box {}x{}, mode {:?}, placeholder font: {}",
            geometry.width,
            geometry.height,
            settings.overflow_mode,
            font.is_placeholder()
        );

        Self {
            tags: TagSet::from_settings(&settings),
            byte_map: ByteMap::from_settings(&settings),
            font,
            geometry,
            params,
            settings,
        }
    }

    pub fn settings(&self) -> &Arc<AppSettings> {
        &self.settings
    }

    pub fn font(&self) -> &ActiveFont {
        &self.font
    }

    pub fn geometry(&self) -> &BoxGeometry {
        &self.geometry
    }

    pub fn layout_params(&self) -> &LayoutParams {
        &self.params
    }

    /// Preview one block's content, optionally against its reference block
    pub fn preview_text(&self, content: &str, reference: Option<&str>) -> BlockPreview {
        let separators = self.settings.active_separators();
        let visible = strip_separators(content, separators);
        let tokens = self.tags.tokenize(&visible);
        let layout = layout_block(&tokens.tokens, &self.font, &self.params);

        let mut overflow = match self.settings.overflow_mode {
            OverflowMode::Pixel => detect_pixel(&layout, &self.geometry),
            OverflowMode::Character => detect_characters(
                &line_char_counts(&tokens.tokens),
                self.settings.max_characters,
            ),
        };

        let budget = match reference {
            Some(reference) if self.settings.enable_byte_restriction => {
                let reference = strip_separators(reference, separators);
                let report = budget::compare(&self.byte_map, &visible, &reference);
                if report.is_over() {
                    let mut kinds = overflow.kinds;
                    kinds.bytes = true;
                    overflow = OverflowReport::new(kinds, overflow.lines);
                }
                Some(report)
            }
            _ => None,
        };

        BlockPreview {
            tokens,
            layout,
            overflow,
            budget,
        }
    }

    pub fn preview_block(&self, block: &Block, reference: Option<&Block>) -> BlockPreview {
        self.preview_text(&block.content, reference.map(|b| b.content.as_str()))
    }

    /// Recompute the overflow flags of every block; returns how many overflow
    pub fn refresh_script(&self, script: &mut Script, reference: Option<&Script>) -> usize {
        let mut count = 0;
        for block in &mut script.blocks {
            let reference = reference.and_then(|r| r.block(block.index));
            let preview = self.preview_block(block, reference);
            block.set_overflow(preview.overflow.kinds);
            if block.is_overflowing {
                count += 1;
            }
        }
        tracing::debug!(
            "Refreshed '{}': {} of {} blocks overflow",
            script.name,
            count,
            script.blocks.len()
        );
        count
    }
}
