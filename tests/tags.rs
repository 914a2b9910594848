//! Tag processing through the preview pipeline

mod common;

use boxfit::color::Color;
use boxfit::overflow::OverflowMode;
use boxfit::settings::{AppSettings, ColorTag, ImageTag};
use boxfit::tags::{TagSet, Token};
use common::test_engine;

fn color_tag(open: &str, close: &str, color: Color) -> ColorTag {
    ColorTag {
        opening_tag: open.to_string(),
        closing_tag: close.to_string(),
        color,
        enabled: true,
    }
}

fn colors_of(tokens: &[Token]) -> Vec<Option<Color>> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Text { color, .. } => Some(*color),
            _ => None,
        })
        .collect()
}

#[test]
fn test_nested_colors_restore_outer_color() {
    let red = Color::rgb(255, 0, 0);
    let blue = Color::rgb(0, 0, 255);
    let settings = AppSettings {
        color_tags: vec![color_tag("<r>", "</r>", red), color_tag("<b>", "</b>", blue)],
        ..AppSettings::default()
    };
    let out = TagSet::from_settings(&settings).tokenize("<r>a<b>b</b>c</r>d");
    assert_eq!(out.visible_text(), "abcd");
    assert_eq!(
        colors_of(&out.tokens),
        vec![Some(red), Some(blue), Some(red), None]
    );
}

#[test]
fn test_disabled_tags_are_plain_text() {
    let mut tag = color_tag("<r>", "</r>", Color::WHITE);
    tag.enabled = false;
    let settings = AppSettings {
        color_tags: vec![tag],
        ..AppSettings::default()
    };
    let out = TagSet::from_settings(&settings).tokenize("<r>x");
    assert_eq!(out.visible_text(), "<r>x");
}

#[test]
fn test_line_break_tags_become_breaks() {
    let settings = AppSettings {
        enable_line_break_tags: true,
        line_break_tags: vec!["[BR]".to_string(), "\\n".to_string()],
        ..AppSettings::default()
    };
    let out = TagSet::from_settings(&settings).tokenize("a[BR]b\\nc");
    assert_eq!(out.visible_text(), "a\nb\nc");

    // Ignored unless the feature is on
    let off = AppSettings {
        enable_line_break_tags: false,
        ..settings
    };
    assert_eq!(
        TagSet::from_settings(&off).tokenize("a[BR]b").visible_text(),
        "a[BR]b"
    );
}

#[test]
fn test_hide_patterns_only_apply_when_hiding() {
    let settings = AppSettings {
        hide_tags_in_preview: true,
        tag_patterns_to_hide: vec![r"\{[^}]*\}".to_string()],
        ..AppSettings::default()
    };
    let out = TagSet::from_settings(&settings).tokenize("Hi{wait:30}!");
    assert_eq!(out.visible_text(), "Hi!");
    assert_eq!(out.hidden, vec![2..11]);

    let shown = AppSettings {
        hide_tags_in_preview: false,
        ..settings
    };
    let out = TagSet::from_settings(&shown).tokenize("Hi{wait:30}!");
    assert_eq!(out.visible_text(), "Hi{wait:30}!");
}

#[test]
fn test_invalid_hide_pattern_is_skipped() {
    let settings = AppSettings {
        hide_tags_in_preview: true,
        tag_patterns_to_hide: vec!["(".to_string(), "#".to_string()],
        ..AppSettings::default()
    };
    let out = TagSet::from_settings(&settings).tokenize("a(b#c");
    assert_eq!(out.visible_text(), "a(bc");
}

#[test]
fn test_image_tag_counts_as_one_glyph() {
    let settings = AppSettings {
        image_tags: vec![ImageTag {
            tag: "[KEY]".to_string(),
            width: 24.0,
            height: 12.0,
            ..ImageTag::default()
        }],
        ..AppSettings::default()
    };
    let engine = test_engine(settings);
    let preview = engine.preview_text("a[KEY]b", None);
    let line = &preview.layout.lines[0];
    assert_eq!(line.char_count, 3);
    assert_eq!(line.width, 10.0 + 24.0 + 10.0);
}

#[test]
fn test_markup_is_not_measured() {
    let settings = AppSettings {
        preview_width: 50.0,
        color_tags: vec![color_tag("<red>", "</red>", Color::rgb(255, 0, 0))],
        ..AppSettings::default()
    };
    let engine = test_engine(settings);
    let preview = engine.preview_text("<red>Hello</red>", None);
    assert!(!preview.overflow.overflowing);
    assert_eq!(preview.layout.width, 50.0);
}

#[test]
fn test_character_mode_ignores_tags() {
    let settings = AppSettings {
        overflow_mode: OverflowMode::Character,
        max_characters: 5,
        color_tags: vec![color_tag("<b>", "</b>", Color::rgb(0, 0, 255))],
        ..AppSettings::default()
    };
    let engine = test_engine(settings);
    assert!(!engine.preview_text("<b>Hello</b>", None).overflow.overflowing);

    let over = engine.preview_text("<b>Hello!</b>", None);
    assert!(over.overflow.kinds.characters);
    assert_eq!(over.overflow.lines, vec![0]);
}
