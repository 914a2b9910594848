//! Overflow detection
//!
//! Pixel mode compares a laid-out block against the configured box.
//! With margins enabled each edge plays one of two roles:
//!
//! - `break_line = true`: the margin is an inset fed to layout (text wraps
//!   at it); crossing it is never reported against that edge
//! - `break_line = false`: the margin is a hard boundary; crossing it is an
//!   edge overflow, and layout ignores it
//!
//! Character mode counts visible characters on each explicit line.
//! Both checks are pure functions of their inputs.

use serde::{Deserialize, Serialize};

use crate::layout::{BlockLayout, LayoutLine, LayoutParams};
use crate::settings::{AppSettings, Margin, Margins};
use crate::tags::Token;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowMode {
    #[default]
    Pixel,
    Character,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    fn margin(self, margins: &Margins) -> Margin {
        match self {
            Edge::Top => margins.top,
            Edge::Right => margins.right,
            Edge::Bottom => margins.bottom,
            Edge::Left => margins.left,
        }
    }
}

/// Margin edges crossed by the content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EdgeFlags {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl EdgeFlags {
    pub fn get(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
        }
    }

    fn set(&mut self, edge: Edge, value: bool) {
        match edge {
            Edge::Top => self.top = value,
            Edge::Right => self.right = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
        }
    }

    pub fn any(&self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

/// Why a block overflows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowKinds {
    pub width: bool,
    pub height: bool,
    pub characters: bool,
    pub edges: EdgeFlags,
    /// Edited line costs more bytes than the reference line
    pub bytes: bool,
}

impl OverflowKinds {
    pub fn any(&self) -> bool {
        self.width || self.height || self.characters || self.bytes || self.edges.any()
    }

    /// Short names of every set flag, e.g. `["width", "margin-right"]`
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.width {
            labels.push("width");
        }
        if self.height {
            labels.push("height");
        }
        if self.characters {
            labels.push("characters");
        }
        for edge in Edge::ALL {
            if self.edges.get(edge) {
                labels.push(match edge {
                    Edge::Top => "margin-top",
                    Edge::Right => "margin-right",
                    Edge::Bottom => "margin-bottom",
                    Edge::Left => "margin-left",
                });
            }
        }
        if self.bytes {
            labels.push("bytes");
        }
        labels
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverflowReport {
    pub overflowing: bool,
    pub kinds: OverflowKinds,
    /// Indices of the offending lines
    pub lines: Vec<usize>,
}

impl OverflowReport {
    pub fn new(kinds: OverflowKinds, mut lines: Vec<usize>) -> Self {
        lines.sort_unstable();
        lines.dedup();
        Self {
            overflowing: kinds.any(),
            kinds,
            lines,
        }
    }
}

/// Box dimensions and limits taken from a settings snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxGeometry {
    /// 0 = auto
    pub width: f32,
    /// 0 = auto
    pub height: f32,
    /// Only used when both dimensions are auto and margins are off
    pub max_pixel_height: f32,
    pub margins: Option<Margins>,
}

impl BoxGeometry {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            width: settings.preview_width,
            height: settings.preview_height,
            max_pixel_height: settings.max_pixel_height,
            margins: settings.enable_margins.then_some(settings.margins),
        }
    }

    /// Inset applied to layout for `edge`
    fn inset(&self, edge: Edge) -> f32 {
        let dimension = match edge {
            Edge::Left | Edge::Right => self.width,
            Edge::Top | Edge::Bottom => self.height,
        };
        match self.margins {
            Some(margins) if dimension > 0.0 => {
                let margin = edge.margin(&margins);
                if margin.break_line {
                    margin.value
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    /// Fill in the wrap region of `params`: available width/height and origin
    pub fn apply_to(&self, params: &mut LayoutParams) {
        params.origin_x = self.inset(Edge::Left);
        params.origin_y = self.inset(Edge::Top);
        params.available_width = constrained(
            self.width,
            self.inset(Edge::Left) + self.inset(Edge::Right),
        );
        params.available_height = constrained(
            self.height,
            self.inset(Edge::Top) + self.inset(Edge::Bottom),
        );
    }

    /// Hard boundary along `edge` in box coordinates, if the edge has one
    fn hard_limit(&self, edge: Edge) -> Option<f32> {
        let margins = self.margins?;
        let margin = edge.margin(&margins);
        if margin.break_line {
            return None;
        }
        match edge {
            Edge::Left if self.width > 0.0 => Some(margin.value),
            Edge::Right if self.width > 0.0 => Some(self.width - margin.value),
            Edge::Top if self.height > 0.0 => Some(margin.value),
            Edge::Bottom if self.height > 0.0 => Some(self.height - margin.value),
            _ => None,
        }
    }
}

/// Available extent after insets; stays constrained even when the insets
/// consume the whole dimension
fn constrained(dimension: f32, insets: f32) -> f32 {
    if dimension > 0.0 {
        (dimension - insets).max(f32::MIN_POSITIVE)
    } else {
        0.0
    }
}

/// Check a laid-out block against the box
pub fn detect_pixel(layout: &BlockLayout, geometry: &BoxGeometry) -> OverflowReport {
    let mut kinds = OverflowKinds::default();
    let mut lines = Vec::new();

    if geometry.margins.is_none() {
        if geometry.width > 0.0 && layout.width > geometry.width {
            kinds.width = true;
            lines.extend(offending(layout, |l| l.width > geometry.width));
        }
        let height_limit = if geometry.height > 0.0 {
            Some(geometry.height)
        } else if geometry.width <= 0.0 && geometry.max_pixel_height > 0.0 {
            Some(geometry.max_pixel_height)
        } else {
            None
        };
        if let Some(limit) = height_limit.filter(|limit| layout.height > *limit) {
            kinds.height = true;
            lines.extend(offending(layout, |l| l.y + l.height > limit));
        }
        return OverflowReport::new(kinds, lines);
    }

    if layout.is_empty() {
        return OverflowReport::new(kinds, lines);
    }

    let bounds = layout.bounds;
    if geometry.width > 0.0 && bounds.right() > geometry.width {
        kinds.width = true;
        lines.extend(offending(layout, |l| l.x + l.width > geometry.width));
    }
    if geometry.height > 0.0 && bounds.bottom() > geometry.height {
        kinds.height = true;
        lines.extend(offending(layout, |l| l.y + l.height > geometry.height));
    }

    for edge in Edge::ALL {
        let Some(limit) = geometry.hard_limit(edge) else {
            continue;
        };
        let crossed = match edge {
            Edge::Left => bounds.x < limit,
            Edge::Right => bounds.right() > limit,
            Edge::Top => bounds.y < limit,
            Edge::Bottom => bounds.bottom() > limit,
        };
        if crossed {
            kinds.edges.set(edge, true);
            lines.extend(offending(layout, |l| match edge {
                Edge::Left => l.x < limit,
                Edge::Right => l.x + l.width > limit,
                Edge::Top => l.y < limit,
                Edge::Bottom => l.y + l.height > limit,
            }));
        }
    }

    OverflowReport::new(kinds, lines)
}

fn offending(layout: &BlockLayout, pred: impl Fn(&LayoutLine) -> bool) -> Vec<usize> {
    layout
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| pred(line))
        .map(|(i, _)| i)
        .collect()
}

/// Visible characters on each explicit line of a token stream
pub fn line_char_counts(tokens: &[Token]) -> Vec<usize> {
    let mut counts = vec![0];
    for token in tokens {
        match token {
            Token::LineBreak => counts.push(0),
            Token::Text { .. } | Token::Image { .. } => {
                if let Some(count) = counts.last_mut() {
                    *count += 1;
                }
            }
        }
    }
    if tokens.is_empty() {
        counts.clear();
    }
    counts
}

/// Compare per-line character counts against a limit (0 = unlimited)
pub fn detect_characters(counts: &[usize], max_characters: usize) -> OverflowReport {
    if max_characters == 0 {
        return OverflowReport::default();
    }
    let lines: Vec<usize> = counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > max_characters)
        .map(|(i, _)| i)
        .collect();
    let kinds = OverflowKinds {
        characters: !lines.is_empty(),
        ..OverflowKinds::default()
    };
    OverflowReport::new(kinds, lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;

    fn one_line(x: f32, width: f32, height: f32) -> BlockLayout {
        BlockLayout {
            lines: vec![LayoutLine {
                x,
                width,
                height,
                ..LayoutLine::default()
            }],
            width,
            height,
            bounds: Rect::new(x, 0.0, width, height),
        }
    }

    #[test]
    fn test_auto_dimensions_never_overflow() {
        let geometry = BoxGeometry::default();
        assert!(!detect_pixel(&one_line(0.0, 5000.0, 5000.0), &geometry).overflowing);
    }

    #[test]
    fn test_max_pixel_height_only_when_both_auto() {
        let mut geometry = BoxGeometry {
            max_pixel_height: 20.0,
            ..BoxGeometry::default()
        };
        assert!(detect_pixel(&one_line(0.0, 10.0, 30.0), &geometry).kinds.height);
        geometry.width = 100.0;
        assert!(!detect_pixel(&one_line(0.0, 10.0, 30.0), &geometry).overflowing);
    }

    #[test]
    fn test_exact_fit_is_not_overflow() {
        let geometry = BoxGeometry {
            width: 100.0,
            height: 20.0,
            ..BoxGeometry::default()
        };
        assert!(!detect_pixel(&one_line(0.0, 100.0, 20.0), &geometry).overflowing);
    }

    #[test]
    fn test_wrap_region_from_break_line_margins() {
        let mut margins = Margins::default();
        margins.left = Margin {
            value: 8.0,
            break_line: true,
        };
        margins.right = Margin {
            value: 4.0,
            break_line: false,
        };
        let geometry = BoxGeometry {
            width: 100.0,
            height: 0.0,
            margins: Some(margins),
            ..BoxGeometry::default()
        };
        let mut params = LayoutParams::default();
        geometry.apply_to(&mut params);
        assert_eq!(params.origin_x, 8.0);
        assert_eq!(params.available_width, 92.0);
        assert_eq!(params.available_height, 0.0);
    }

    #[test]
    fn test_character_limit_boundary() {
        assert!(!detect_characters(&[5, 3], 5).overflowing);
        let report = detect_characters(&[5, 6], 5);
        assert!(report.kinds.characters);
        assert_eq!(report.lines, vec![1]);
        assert!(!detect_characters(&[500], 0).overflowing);
    }

    #[test]
    fn test_line_char_counts_split_on_breaks() {
        let tokens = vec![
            Token::text('a'),
            Token::LineBreak,
            Token::Image {
                tag: 0,
                width: 1.0,
                height: 1.0,
            },
            Token::text('b'),
        ];
        assert_eq!(line_char_counts(&tokens), vec![1, 2]);
        assert!(line_char_counts(&[]).is_empty());
    }

    #[test]
    fn test_labels() {
        let kinds = OverflowKinds {
            width: true,
            edges: EdgeFlags {
                right: true,
                ..EdgeFlags::default()
            },
            ..OverflowKinds::default()
        };
        assert_eq!(kinds.labels(), vec!["width", "margin-right"]);
    }
}
