//! Tag processor
//!
//! Turns block content with inline markup into the token sequence consumed
//! by the layout engine. Processing order is fixed:
//!
//! 1. Line-break tag literals are replaced with `\n`.
//! 2. One left-to-right scan tries, at each position: image tags, color
//!    tag openings/closings, hide patterns (only when hiding is enabled),
//!    and finally emits the character itself.
//!
//! Unclosed color regions run to the end of the block. Bad definitions never
//! fail tokenization; the first definition that matches at a position wins.

pub mod matcher;

pub use matcher::{compile_patterns, Matcher, PatternMatcher};

use std::ops::Range;

use crate::color::Color;
use crate::settings::AppSettings;

/// One unit of laid-out content
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Text { ch: char, color: Option<Color> },
    /// A fixed-size image; `tag` indexes the settings' image tag list
    Image { tag: usize, width: f32, height: f32 },
    LineBreak,
}

impl Token {
    pub fn text(ch: char) -> Self {
        Token::Text { ch, color: None }
    }
}

#[derive(Debug, Clone)]
struct ColorRule {
    opening: String,
    closing: String,
    color: Color,
}

#[derive(Debug, Clone)]
struct ImageRule {
    tag: usize,
    literal: String,
    width: f32,
    height: f32,
}

/// Tokenizer output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    /// Byte ranges removed by hide patterns, relative to the text after
    /// line-break tags were replaced
    pub hidden: Vec<Range<usize>>,
}

impl Tokenized {
    /// The text a reader sees: markup and hidden spans removed,
    /// images shown as U+FFFC
    pub fn visible_text(&self) -> String {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Text { ch, .. } => *ch,
                Token::Image { .. } => '\u{FFFC}',
                Token::LineBreak => '\n',
            })
            .collect()
    }
}

/// Enabled tag definitions, compiled once per settings snapshot
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    colors: Vec<ColorRule>,
    images: Vec<ImageRule>,
    line_breaks: Vec<String>,
    hide: Vec<PatternMatcher>,
    hide_in_preview: bool,
}

impl TagSet {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let colors = settings
            .color_tags
            .iter()
            .filter(|tag| tag.enabled)
            .filter_map(|tag| {
                if tag.opening_tag.is_empty() || tag.opening_tag == tag.closing_tag {
                    tracing::warn!(
                        "Skipping color tag '{}': opening tag must be non-empty and differ from closing tag",
                        tag.opening_tag
                    );
                    return None;
                }
                Some(ColorRule {
                    opening: tag.opening_tag.clone(),
                    closing: tag.closing_tag.clone(),
                    color: tag.color,
                })
            })
            .collect();

        let images = settings
            .image_tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| tag.enabled && !tag.tag.is_empty())
            .map(|(index, tag)| ImageRule {
                tag: index,
                literal: tag.tag.clone(),
                width: tag.width.max(1.0),
                height: tag.height.max(1.0),
            })
            .collect();

        let line_breaks = if settings.enable_line_break_tags {
            settings
                .line_break_tags
                .iter()
                .filter(|t| !t.is_empty())
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let hide_in_preview = settings.hide_tags_in_preview;
        let hide = if hide_in_preview {
            compile_patterns(&settings.tag_patterns_to_hide)
        } else {
            Vec::new()
        };

        Self {
            colors,
            images,
            line_breaks,
            hide,
            hide_in_preview,
        }
    }

    /// Tokenize block content
    pub fn tokenize(&self, content: &str) -> Tokenized {
        let mut text = content.to_string();
        for literal in &self.line_breaks {
            if text.contains(literal.as_str()) {
                text = text.replace(literal.as_str(), "\n");
            }
        }

        let mut out = Tokenized::default();
        let mut color_stack: Vec<usize> = Vec::new();
        let mut hide_cache: Vec<Option<Option<Range<usize>>>> = vec![None; self.hide.len()];
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];

            if let Some(rule) = self.images.iter().find(|r| rest.starts_with(&r.literal)) {
                out.tokens.push(Token::Image {
                    tag: rule.tag,
                    width: rule.width,
                    height: rule.height,
                });
                pos += rule.literal.len();
                continue;
            }

            if let Some(consumed) = self.match_color(rest, &mut color_stack) {
                pos += consumed;
                continue;
            }

            if self.hide_in_preview {
                if let Some(end) = self.hidden_span_at(&text, pos, &mut hide_cache) {
                    out.hidden.push(pos..end);
                    pos = end;
                    continue;
                }
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            pos += ch.len_utf8();
            match ch {
                '\n' => out.tokens.push(Token::LineBreak),
                '\r' => {}
                ch => out.tokens.push(Token::Text {
                    ch,
                    color: color_stack.last().map(|&i| self.colors[i].color),
                }),
            }
        }

        out
    }

    /// Try color openings and closings at the start of `rest`, returning the
    /// number of bytes consumed
    fn match_color(&self, rest: &str, stack: &mut Vec<usize>) -> Option<usize> {
        for (index, rule) in self.colors.iter().enumerate() {
            if rest.starts_with(&rule.opening) {
                stack.push(index);
                return Some(rule.opening.len());
            }
            if !rule.closing.is_empty() && rest.starts_with(&rule.closing) {
                if stack.last() == Some(&index) {
                    stack.pop();
                }
                return Some(rule.closing.len());
            }
        }
        None
    }

    /// End of a hide-pattern match starting exactly at `pos`, if any.
    ///
    /// `cache` holds the next known match per pattern so the text is not
    /// rescanned from every position.
    fn hidden_span_at(
        &self,
        text: &str,
        pos: usize,
        cache: &mut [Option<Option<Range<usize>>>],
    ) -> Option<usize> {
        for (pattern, slot) in self.hide.iter().zip(cache.iter_mut()) {
            let stale = match slot {
                None => true,
                Some(Some(found)) => found.start < pos,
                Some(None) => false,
            };
            if stale {
                *slot = Some(pattern.find(text, pos));
            }
            if let Some(Some(found)) = slot {
                if found.start == pos {
                    return Some(found.end);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ColorTag, ImageTag};

    fn red() -> Color {
        Color::rgb(255, 0, 0)
    }

    fn settings_with_color() -> AppSettings {
        AppSettings {
            color_tags: vec![ColorTag {
                opening_tag: "[red]".into(),
                closing_tag: "[/red]".into(),
                color: red(),
                enabled: true,
            }],
            ..AppSettings::default()
        }
    }

    #[test]
    fn test_color_region_applies_to_enclosed_chars() {
        let tags = TagSet::from_settings(&settings_with_color());
        let out = tags.tokenize("a[red]b[/red]c");
        assert_eq!(
            out.tokens,
            vec![
                Token::text('a'),
                Token::Text {
                    ch: 'b',
                    color: Some(red())
                },
                Token::text('c'),
            ]
        );
    }

    #[test]
    fn test_unclosed_color_runs_to_end() {
        let tags = TagSet::from_settings(&settings_with_color());
        let out = tags.tokenize("[red]ab");
        assert!(out
            .tokens
            .iter()
            .all(|t| matches!(t, Token::Text { color: Some(c), .. } if *c == red())));
    }

    #[test]
    fn test_identical_open_close_skipped() {
        let mut settings = settings_with_color();
        settings.color_tags[0].closing_tag = "[red]".into();
        let tags = TagSet::from_settings(&settings);
        assert_eq!(tags.tokenize("[red]").tokens.len(), 5);
    }

    #[test]
    fn test_image_tag_wins_over_hide_pattern() {
        let settings = AppSettings {
            image_tags: vec![ImageTag {
                tag: "<A>".into(),
                width: 12.0,
                height: 10.0,
                ..ImageTag::default()
            }],
            hide_tags_in_preview: true,
            tag_patterns_to_hide: vec!["<[^>]*>".into()],
            ..AppSettings::default()
        };
        let out = TagSet::from_settings(&settings).tokenize("<A><b>x");
        assert_eq!(
            out.tokens,
            vec![
                Token::Image {
                    tag: 0,
                    width: 12.0,
                    height: 10.0
                },
                Token::text('x'),
            ]
        );
        assert_eq!(out.hidden, vec![3..6]);
    }

    #[test]
    fn test_hide_patterns_ignored_when_disabled() {
        let settings = AppSettings {
            hide_tags_in_preview: false,
            tag_patterns_to_hide: vec!["<[^>]*>".into()],
            ..AppSettings::default()
        };
        let out = TagSet::from_settings(&settings).tokenize("<b>");
        assert_eq!(out.visible_text(), "<b>");
    }

    #[test]
    fn test_line_break_tags_become_breaks() {
        let settings = AppSettings {
            enable_line_break_tags: true,
            line_break_tags: vec!["{br}".into()],
            ..AppSettings::default()
        };
        let out = TagSet::from_settings(&settings).tokenize("a{br}b\r\nc");
        assert_eq!(out.visible_text(), "a\nb\nc");
    }
}
