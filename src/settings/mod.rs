//! Preview settings
//!
//! `AppSettings` is the single configuration record that drives
//! segmentation, tag processing, font metrics, layout and overflow checks.
//! It is serialized with camelCase keys so a settings profile exported as
//! JSON can be edited by hand or shared between users.
//!
//! Every struct uses `#[serde(default)]`, so importing an older profile that
//! lacks newer keys merges field by field over the defaults.
//!
//! Settings are treated as immutable snapshots by the preview core: a change
//! goes through [`AppSettings::set`] / [`AppSettings::set_nested`], which
//! produce a sanitized copy, and the engine is rebuilt from the new value.

mod tags;

pub use tags::{ByteMapEntry, ColorTag, ImageTag};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Color;
use crate::layout::{HorizontalAlign, VerticalAlign, WrapMode};
use crate::overflow::OverflowMode;
use crate::script::SegmentationMode;

pub const MIN_FONT_SIZE: f32 = 6.0;
pub const MAX_FONT_SIZE: f32 = 120.0;
pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;
pub const MAX_LETTER_SPACING: f32 = 50.0;
pub const MAX_BOX_DIMENSION: f32 = 10_000.0;
/// Upper bound for bitmap tile sizes and separations, in source pixels
pub const MAX_TILE_DIMENSION: u32 = 10_000;

/// Keys of the three mutually exclusive segmentation toggles
const SEGMENTATION_TOGGLES: [&str; 3] = [
    "treatEachLineAsBlock",
    "useEmptyLinesAsSeparator",
    "useCustomBlockSeparator",
];

/// Errors from loading, saving or updating settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("setting '{0}' is not an object")]
    NotAnObject(String),
    #[error("invalid value for '{key}': {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse settings profile: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which font model is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontKind {
    #[default]
    System,
    Bitmap,
}

/// Parameters for rendering with a font the host can measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemFont {
    pub family: String,
    pub size: f32,
    pub color: Color,
    /// CSS-style weight (400 = normal, 700 = bold)
    pub weight: u16,
    pub letter_spacing: f32,
    /// Width of a space in pixels; 0 uses the font's own advance
    pub space_width_override: f32,
    pub align: HorizontalAlign,
    /// Font file (path or `data:` URL) to measure with
    pub source: Option<String>,
}

impl Default for SystemFont {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 16.0,
            color: Color::WHITE,
            weight: 400,
            letter_spacing: 0.0,
            space_width_override: 0.0,
            align: HorizontalAlign::Left,
            source: None,
        }
    }
}

/// Parameters of a tile-sheet bitmap font
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BitmapFontSettings {
    /// Tile sheet image (path or `data:` URL)
    pub image: Option<String>,
    pub tile_width: u32,
    pub tile_height: u32,
    pub separation_x: u32,
    pub separation_y: u32,
    /// Characters in tile order; the n-th char is drawn from the n-th tile
    pub char_map: String,
    /// Extra pixels between glyphs (source pixels, scaled by zoom)
    pub spacing: f32,
    pub zoom: f32,
    /// Background color to treat as transparent
    pub color_key: Option<Color>,
    /// Per-channel tolerance for `color_key`
    pub color_key_tolerance: u8,
    /// Recolor every opaque pixel to this color
    pub tint_color: Option<Color>,
    /// Measure each glyph by its inked columns instead of the full tile
    pub pixel_scanning: bool,
    /// Width of a space in source pixels; 0 uses the default
    pub space_width_override: f32,
    pub align: HorizontalAlign,
}

impl Default for BitmapFontSettings {
    fn default() -> Self {
        Self {
            image: None,
            tile_width: 8,
            tile_height: 8,
            separation_x: 0,
            separation_y: 0,
            char_map: (' '..='~').collect(),
            spacing: 0.0,
            zoom: 1.0,
            color_key: None,
            color_key_tolerance: 0,
            tint_color: None,
            pixel_scanning: false,
            space_width_override: 0.0,
            align: HorizontalAlign::Left,
        }
    }
}

/// The font model selected for rendering, borrowed from the settings
#[derive(Debug, Clone, Copy)]
pub enum FontModel<'a> {
    System(&'a SystemFont),
    Bitmap(&'a BitmapFontSettings),
}

impl FontModel<'_> {
    pub fn align(&self) -> HorizontalAlign {
        match self {
            FontModel::System(font) => font.align,
            FontModel::Bitmap(font) => font.align,
        }
    }
}

/// Inset from one edge of the box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Margin {
    pub value: f32,
    /// `true`: text wraps at the margin. `false`: crossing it is an overflow.
    pub break_line: bool,
}

/// Margins for the four box edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: Margin,
    pub right: Margin,
    pub bottom: Margin,
    pub left: Margin,
}

/// All settings that influence the preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    // === Segmentation ===
    pub treat_each_line_as_block: bool,
    pub use_empty_lines_as_separator: bool,
    pub use_custom_block_separator: bool,
    pub custom_block_separators: Vec<String>,

    // === Box ===
    /// Box width in pixels; 0 means auto
    pub preview_width: f32,
    /// Box height in pixels; 0 means auto
    pub preview_height: f32,
    /// Height limit used when both box dimensions are auto; 0 disables it
    pub max_pixel_height: f32,
    pub preview_scale: f32,
    pub background_color: Color,
    pub vertical_align: VerticalAlign,
    pub global_line_height_factor: f32,
    pub wrap_mode: WrapMode,

    // === Font ===
    pub font_type: FontKind,
    pub system_font: SystemFont,
    pub bitmap_font: BitmapFontSettings,

    // === Tags ===
    pub color_tags: Vec<ColorTag>,
    pub image_tags: Vec<ImageTag>,
    pub enable_line_break_tags: bool,
    pub line_break_tags: Vec<String>,
    pub hide_tags_in_preview: bool,
    pub tag_patterns_to_hide: Vec<String>,

    // === Margins ===
    pub enable_margins: bool,
    pub margins: Margins,

    // === Overflow ===
    pub overflow_mode: OverflowMode,
    /// Longest allowed line in character mode; 0 means unlimited
    pub max_characters: usize,

    // === Byte budget ===
    pub enable_byte_restriction: bool,
    pub byte_map: Vec<ByteMapEntry>,
    pub default_byte_value: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            treat_each_line_as_block: false,
            use_empty_lines_as_separator: true,
            use_custom_block_separator: false,
            custom_block_separators: Vec::new(),

            preview_width: 240.0,
            preview_height: 64.0,
            max_pixel_height: 0.0,
            preview_scale: 1.0,
            background_color: Color::rgb(0x10, 0x10, 0x30),
            vertical_align: VerticalAlign::Top,
            global_line_height_factor: 1.0,
            wrap_mode: WrapMode::Word,

            font_type: FontKind::System,
            system_font: SystemFont::default(),
            bitmap_font: BitmapFontSettings::default(),

            color_tags: Vec::new(),
            image_tags: Vec::new(),
            enable_line_break_tags: false,
            line_break_tags: Vec::new(),
            hide_tags_in_preview: false,
            tag_patterns_to_hide: Vec::new(),

            enable_margins: false,
            margins: Margins::default(),

            overflow_mode: OverflowMode::Pixel,
            max_characters: 0,

            enable_byte_restriction: false,
            byte_map: Vec::new(),
            default_byte_value: 1,
        }
    }
}

impl AppSettings {
    /// Parse a settings profile, merging it over the defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: AppSettings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Serialize as a pretty-printed settings profile
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a settings profile from disk
    pub fn load_profile(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&content)?;
        tracing::info!("Loaded settings profile from {}", path.display());
        Ok(settings)
    }

    /// Write this profile to disk, creating the parent directory if needed
    pub fn save_profile(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_json()?).map_err(io_err)?;
        tracing::info!("Saved settings profile to {}", path.display());
        Ok(())
    }

    /// Update a top-level setting by its profile key
    ///
    /// Enabling one segmentation toggle disables the other two.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let enabling = value.as_bool() == Some(true);
        let mut doc = serde_json::to_value(&*self)?;
        let fields = doc
            .as_object_mut()
            .ok_or_else(|| SettingsError::NotAnObject("settings".to_string()))?;
        if !fields.contains_key(key) {
            return Err(SettingsError::UnknownKey(key.to_string()));
        }
        fields.insert(key.to_string(), value);

        if enabling && SEGMENTATION_TOGGLES.contains(&key) {
            for other in SEGMENTATION_TOGGLES.iter().filter(|k| **k != key) {
                fields.insert(other.to_string(), Value::Bool(false));
            }
        }

        *self = Self::rebuild(doc, key)?;
        tracing::debug!("Setting '{}' updated", key);
        Ok(())
    }

    /// Update one field of a nested settings object, e.g. `("bitmapFont", "zoom")`
    pub fn set_nested(
        &mut self,
        parent: &str,
        child: &str,
        value: Value,
    ) -> Result<(), SettingsError> {
        let mut doc = serde_json::to_value(&*self)?;
        let nested = doc
            .get_mut(parent)
            .ok_or_else(|| SettingsError::UnknownKey(parent.to_string()))?
            .as_object_mut()
            .ok_or_else(|| SettingsError::NotAnObject(parent.to_string()))?;
        if !nested.contains_key(child) {
            return Err(SettingsError::UnknownKey(format!("{}.{}", parent, child)));
        }
        nested.insert(child.to_string(), value);

        *self = Self::rebuild(doc, &format!("{}.{}", parent, child))?;
        tracing::debug!("Setting '{}.{}' updated", parent, child);
        Ok(())
    }

    fn rebuild(doc: Value, key: &str) -> Result<Self, SettingsError> {
        let settings: AppSettings =
            serde_json::from_value(doc).map_err(|source| SettingsError::InvalidValue {
                key: key.to_string(),
                source,
            })?;
        Ok(settings.sanitized())
    }

    /// Clamp numeric ranges and enforce the segmentation toggle invariant
    pub fn sanitized(mut self) -> Self {
        self.enforce_single_segmentation_mode();

        self.preview_width = clamp_dimension(self.preview_width);
        self.preview_height = clamp_dimension(self.preview_height);
        self.max_pixel_height = clamp_dimension(self.max_pixel_height);
        self.preview_scale = clamp_finite(self.preview_scale, MIN_SCALE, MAX_SCALE, 1.0);
        self.global_line_height_factor =
            clamp_finite(self.global_line_height_factor, MIN_SCALE, MAX_SCALE, 1.0);

        let system = &mut self.system_font;
        system.size = clamp_finite(system.size, MIN_FONT_SIZE, MAX_FONT_SIZE, 16.0);
        system.weight = system.weight.clamp(100, 900);
        system.letter_spacing = clamp_finite(
            system.letter_spacing,
            -MAX_LETTER_SPACING,
            MAX_LETTER_SPACING,
            0.0,
        );
        system.space_width_override = clamp_dimension(system.space_width_override);

        let bitmap = &mut self.bitmap_font;
        bitmap.tile_width = bitmap.tile_width.clamp(1, MAX_TILE_DIMENSION);
        bitmap.tile_height = bitmap.tile_height.clamp(1, MAX_TILE_DIMENSION);
        bitmap.separation_x = bitmap.separation_x.min(MAX_TILE_DIMENSION);
        bitmap.separation_y = bitmap.separation_y.min(MAX_TILE_DIMENSION);
        bitmap.zoom = clamp_finite(bitmap.zoom, MIN_SCALE, MAX_SCALE, 1.0);
        bitmap.spacing = clamp_finite(
            bitmap.spacing,
            -MAX_LETTER_SPACING,
            MAX_LETTER_SPACING,
            0.0,
        );
        bitmap.space_width_override = clamp_dimension(bitmap.space_width_override);

        for tag in &mut self.image_tags {
            tag.width = clamp_finite(tag.width, 1.0, MAX_BOX_DIMENSION, 1.0);
            tag.height = clamp_finite(tag.height, 1.0, MAX_BOX_DIMENSION, 1.0);
        }

        for margin in [
            &mut self.margins.top,
            &mut self.margins.right,
            &mut self.margins.bottom,
            &mut self.margins.left,
        ] {
            margin.value = clamp_dimension(margin.value);
        }

        self
    }

    /// Keep at most one segmentation toggle enabled.
    ///
    /// Precedence when a profile enables several: per-line, then blank-line
    /// runs, then custom separators.
    fn enforce_single_segmentation_mode(&mut self) {
        let enabled = [
            self.treat_each_line_as_block,
            self.use_empty_lines_as_separator,
            self.use_custom_block_separator,
        ];
        if enabled.iter().filter(|on| **on).count() <= 1 {
            return;
        }
        tracing::warn!("Several segmentation modes enabled, keeping the first by precedence");
        if self.treat_each_line_as_block {
            self.use_empty_lines_as_separator = false;
            self.use_custom_block_separator = false;
        } else {
            self.use_custom_block_separator = false;
        }
    }

    /// The active segmentation mode
    pub fn segmentation_mode(&self) -> SegmentationMode {
        if self.treat_each_line_as_block {
            SegmentationMode::PerLine
        } else if self.use_empty_lines_as_separator {
            SegmentationMode::BlankLineRun
        } else if self.use_custom_block_separator {
            SegmentationMode::CustomSeparators(
                self.custom_block_separators
                    .iter()
                    .filter(|s| !s.is_empty())
                    .cloned()
                    .collect(),
            )
        } else {
            SegmentationMode::Whole
        }
    }

    /// Separators to strip from block content before measuring it
    pub fn active_separators(&self) -> &[String] {
        if self.use_custom_block_separator {
            &self.custom_block_separators
        } else {
            &[]
        }
    }

    /// The active font model
    pub fn font_model(&self) -> FontModel<'_> {
        match self.font_type {
            FontKind::System => FontModel::System(&self.system_font),
            FontKind::Bitmap => FontModel::Bitmap(&self.bitmap_font),
        }
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn clamp_dimension(value: f32) -> f32 {
    clamp_finite(value, 0.0, MAX_BOX_DIMENSION, 0.0)
}
