//! Tag and byte-map definitions as they appear in a settings profile

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A pair of literals that colors the text between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorTag {
    pub opening_tag: String,
    pub closing_tag: String,
    pub color: Color,
    pub enabled: bool,
}

impl Default for ColorTag {
    fn default() -> Self {
        Self {
            opening_tag: String::new(),
            closing_tag: String::new(),
            color: Color::rgb(0xFF, 0xD7, 0x00),
            enabled: true,
        }
    }
}

/// A literal replaced by a fixed-size image glyph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageTag {
    pub tag: String,
    pub image_url: String,
    pub width: f32,
    pub height: f32,
    pub enabled: bool,
}

impl Default for ImageTag {
    fn default() -> Self {
        Self {
            tag: String::new(),
            image_url: String::new(),
            width: 16.0,
            height: 16.0,
            enabled: true,
        }
    }
}

/// Cost of one character or tag literal in the target's text buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ByteMapEntry {
    pub token: String,
    pub bytes: u32,
}

impl ByteMapEntry {
    pub fn new(token: impl Into<String>, bytes: u32) -> Self {
        Self {
            token: token.into(),
            bytes,
        }
    }
}
