//! Line layout engine
//!
//! Greedy line filling over the token stream produced by the tag processor.
//! A glyph starts a new line when
//!
//! ```text
//! line_advance + glyph_width + letter_spacing > available_width
//! ```
//!
//! and the current line is not empty. `line_advance` already includes the
//! letter spacing after each glyph placed so far. An available width of 0
//! means the box is unconstrained horizontally and only explicit breaks
//! start new lines.
//!
//! Tokens are atomic: a glyph wider than the available width is placed
//! alone on its own line and overhangs it.

use serde::{Deserialize, Serialize};

use crate::glyph::{GlyphMetrics, GlyphSize};
use crate::tags::Token;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl HorizontalAlign {
    fn factor(self) -> f32 {
        match self {
            HorizontalAlign::Left => 0.0,
            HorizontalAlign::Center => 0.5,
            HorizontalAlign::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    fn factor(self) -> f32 {
        match self {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Middle => 0.5,
            VerticalAlign::Bottom => 1.0,
        }
    }
}

/// Where lines may be broken when they run out of width
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    /// Break at the last space; words longer than a line break per glyph
    #[default]
    Word,
    /// Break before any glyph
    Char,
}

/// Axis-aligned rectangle in box coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// 0 = unconstrained
    pub available_width: f32,
    /// Used for vertical alignment only; 0 = unconstrained
    pub available_height: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub line_height_factor: f32,
    pub h_align: HorizontalAlign,
    pub v_align: VerticalAlign,
    pub wrap: WrapMode,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            available_width: 0.0,
            available_height: 0.0,
            origin_x: 0.0,
            origin_y: 0.0,
            line_height_factor: 1.0,
            h_align: HorizontalAlign::Left,
            v_align: VerticalAlign::Top,
            wrap: WrapMode::Word,
        }
    }
}

/// A token placed in box coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    pub token: Token,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutLine {
    pub glyphs: Vec<PositionedGlyph>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Visible characters on the line (image glyphs count as one)
    pub char_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockLayout {
    pub lines: Vec<LayoutLine>,
    /// Widest line
    pub width: f32,
    /// Sum of line heights
    pub height: f32,
    /// Area covered by the lines after alignment
    pub bounds: Rect,
}

impl BlockLayout {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A line while it is being filled
#[derive(Debug, Default)]
struct LineBuf {
    items: Vec<(Token, GlyphSize)>,
    advance: f32,
    /// Started by wrapping rather than by an explicit break
    wrapped: bool,
}

impl LineBuf {
    fn wrapped() -> Self {
        Self {
            wrapped: true,
            ..Self::default()
        }
    }

    fn push(&mut self, token: Token, size: GlyphSize, spacing: f32) {
        self.items.push((token, size));
        self.advance += size.width + spacing;
    }

    fn recompute_advance(&mut self, spacing: f32) {
        self.advance = self.items.iter().map(|(_, s)| s.width + spacing).sum();
    }

    fn trim_trailing_spaces(&mut self, spacing: f32) {
        let before = self.items.len();
        while matches!(self.items.last(), Some((t, _)) if is_space(t)) {
            self.items.pop();
        }
        if self.items.len() != before {
            self.recompute_advance(spacing);
        }
    }

    /// Move the word after the last space onto a new line.
    ///
    /// Returns `None`, leaving the line untouched, when no space follows
    /// some other glyph.
    fn split_at_last_space(&mut self, spacing: f32) -> Option<LineBuf> {
        let space = self.items.iter().rposition(|(t, _)| is_space(t))?;
        if !self.items[..space].iter().any(|(t, _)| !is_space(t)) {
            return None;
        }
        let mut carry = LineBuf::wrapped();
        for (token, size) in self.items.drain(space + 1..) {
            carry.push(token, size, spacing);
        }
        self.recompute_advance(spacing);
        self.trim_trailing_spaces(spacing);
        Some(carry)
    }

    fn width(&self, spacing: f32) -> f32 {
        if self.items.is_empty() {
            0.0
        } else {
            (self.advance - spacing).max(0.0)
        }
    }
}

fn is_space(token: &Token) -> bool {
    matches!(token, Token::Text { ch, .. } if ch.is_whitespace())
}

fn fits(line: &LineBuf, width: f32, spacing: f32, available: f32) -> bool {
    available <= 0.0 || line.items.is_empty() || line.advance + width + spacing <= available
}

/// Lay out one block's tokens
pub fn layout_block(
    tokens: &[Token],
    metrics: &dyn GlyphMetrics,
    params: &LayoutParams,
) -> BlockLayout {
    let spacing = metrics.letter_spacing();
    let available = params.available_width;
    let mut done: Vec<LineBuf> = Vec::new();
    let mut line = LineBuf::default();

    for token in tokens {
        if matches!(token, Token::LineBreak) {
            done.push(std::mem::take(&mut line));
            continue;
        }

        // Spaces at a wrap point are dropped
        if is_space(token) && line.wrapped && line.items.is_empty() {
            continue;
        }

        let size = metrics.measure(token);
        if !fits(&line, size.width, spacing, available) {
            if is_space(token) {
                line.trim_trailing_spaces(spacing);
                done.push(std::mem::replace(&mut line, LineBuf::wrapped()));
                continue;
            }

            let carry = match params.wrap {
                WrapMode::Word => line.split_at_last_space(spacing),
                WrapMode::Char => None,
            };
            let mut previous = std::mem::replace(&mut line, carry.unwrap_or_else(LineBuf::wrapped));
            previous.trim_trailing_spaces(spacing);
            done.push(previous);

            // The carried word plus this glyph may still be too wide
            if !fits(&line, size.width, spacing, available) {
                done.push(std::mem::replace(&mut line, LineBuf::wrapped()));
            }
        }

        line.push(*token, size, spacing);
    }

    // A break at the very end does not open another line
    if !matches!(tokens.last(), None | Some(Token::LineBreak)) {
        done.push(line);
    }

    place_lines(done, metrics, params, spacing)
}

fn place_lines(
    lines: Vec<LineBuf>,
    metrics: &dyn GlyphMetrics,
    params: &LayoutParams,
    spacing: f32,
) -> BlockLayout {
    let empty_height = metrics.line_height() * params.line_height_factor;
    let measured: Vec<(LineBuf, f32, f32)> = lines
        .into_iter()
        .map(|line| {
            let height = line
                .items
                .iter()
                .map(|(_, size)| size.height)
                .fold(None, |acc: Option<f32>, h| Some(acc.map_or(h, |a| a.max(h))))
                .map_or(empty_height, |h| h * params.line_height_factor);
            let width = line.width(spacing);
            (line, width, height)
        })
        .collect();

    let block_width = measured.iter().map(|(_, w, _)| *w).fold(0.0, f32::max);
    let block_height: f32 = measured.iter().map(|(_, _, h)| *h).sum();

    let region_width = if params.available_width > 0.0 {
        params.available_width
    } else {
        block_width
    };
    let region_height = if params.available_height > 0.0 {
        params.available_height
    } else {
        block_height
    };
    let offset_y = ((region_height - block_height) * params.v_align.factor()).max(0.0);

    let mut y = params.origin_y + offset_y;
    let mut out = Vec::with_capacity(measured.len());
    for (line, width, height) in measured {
        let x = params.origin_x + ((region_width - width) * params.h_align.factor()).max(0.0);
        let mut pen = x;
        let mut char_count = 0;
        let glyphs = line
            .items
            .into_iter()
            .map(|(token, size)| {
                if !matches!(token, Token::LineBreak) {
                    char_count += 1;
                }
                let glyph = PositionedGlyph {
                    token,
                    x: pen,
                    y: y + (height - size.height) / 2.0,
                    width: size.width,
                    height: size.height,
                };
                pen += size.width + spacing;
                glyph
            })
            .collect();
        out.push(LayoutLine {
            glyphs,
            x,
            y,
            width,
            height,
            char_count,
        });
        y += height;
    }

    let bounds = match (
        out.iter().map(|l| l.x).reduce(f32::min),
        out.iter().map(|l| l.x + l.width).reduce(f32::max),
    ) {
        (Some(left), Some(right)) => Rect::new(
            left,
            params.origin_y + offset_y,
            right - left,
            block_height,
        ),
        _ => Rect::new(params.origin_x, params.origin_y, 0.0, 0.0),
    };

    BlockLayout {
        lines: out,
        width: block_width,
        height: block_height,
        bounds,
    }
}
