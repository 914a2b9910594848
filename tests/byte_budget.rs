//! Byte budget tests

mod common;

use boxfit::budget::{compare, ByteMap};
use boxfit::messages::{Msg, ScriptMsg};
use boxfit::settings::{AppSettings, ByteMapEntry};
use boxfit::update::update;
use common::{test_engine, test_model};

fn map(entries: &[(&str, u32)], default_cost: u32) -> ByteMap {
    let entries: Vec<ByteMapEntry> = entries
        .iter()
        .map(|(token, bytes)| ByteMapEntry::new(*token, *bytes))
        .collect();
    ByteMap::new(&entries, default_cost)
}

fn budget_settings() -> AppSettings {
    AppSettings {
        enable_byte_restriction: true,
        byte_map: vec![ByteMapEntry::new("[NAME]", 1), ByteMapEntry::new("é", 2)],
        default_byte_value: 1,
        ..AppSettings::default()
    }
}

// ============================================================================
// Costs
// ============================================================================

#[test]
fn test_longest_token_wins() {
    let m = map(&[("A", 1), ("AB", 5)], 1);
    assert_eq!(m.cost("AB"), 5);
    assert_eq!(m.cost("ABA"), 6);
    assert_eq!(m.cost("BA"), 2);
}

#[test]
fn test_longest_match_regardless_of_definition_order() {
    let m = map(&[("AB", 5), ("A", 1)], 1);
    assert_eq!(m.cost("AB"), 5);
}

#[test]
fn test_equal_tokens_use_first_definition() {
    let m = map(&[("xy", 2), ("xy", 9)], 1);
    assert_eq!(m.cost("xy"), 2);
}

#[test]
fn test_default_cost_per_character() {
    let m = map(&[], 2);
    assert_eq!(m.cost("héllo"), 10);
    assert_eq!(m.cost(""), 0);
}

#[test]
fn test_tag_literal_costs_as_one_token() {
    let m = map(&[("[NAME]", 1)], 1);
    assert_eq!(m.cost("Hi [NAME]!"), 5);
}

#[test]
fn test_line_costs_split_on_newlines() {
    let m = map(&[], 1);
    assert_eq!(m.line_costs("ab\r\ncde\n"), vec![2, 3, 0]);
}

// ============================================================================
// Comparison
// ============================================================================

#[test]
fn test_compare_line_by_line() {
    let m = map(&[], 1);
    let report = compare(&m, "Hello\nWorlds", "Hello\nWorld");
    assert!(report.is_over());
    assert_eq!(report.over_lines(), vec![1]);
    assert_eq!(report.lines[1].used, 6);
    assert_eq!(report.lines[1].limit, 5);
}

#[test]
fn test_extra_line_has_no_budget() {
    let m = map(&[], 1);
    let report = compare(&m, "a\nb", "abc");
    assert_eq!(report.over_lines(), vec![1]);
}

#[test]
fn test_shorter_edit_fits() {
    let m = map(&[], 1);
    assert!(!compare(&m, "Hi\nok", "Hello\nWorld").is_over());
}

// ============================================================================
// Engine
// ============================================================================

#[test]
fn test_engine_flags_byte_overflow() {
    let engine = test_engine(budget_settings());
    let preview = engine.preview_text("Café", Some("Cafe"));
    // 'é' costs 2 against the reference's 'e'
    assert!(preview.overflow.kinds.bytes);
    assert!(preview.overflow.overflowing);
    assert_eq!(preview.budget.unwrap().lines[0].used, 5);

    let fits = engine.preview_text("[NAME]!", Some("Hi"));
    assert!(!fits.overflow.overflowing);
}

#[test]
fn test_budget_needs_feature_and_reference() {
    let engine = test_engine(budget_settings());
    let preview = engine.preview_text("much longer text", None);
    assert!(preview.budget.is_none());
    assert!(!preview.overflow.kinds.bytes);

    let disabled = test_engine(AppSettings {
        enable_byte_restriction: false,
        ..budget_settings()
    });
    let preview = disabled.preview_text("much longer text", Some("short"));
    assert!(preview.budget.is_none());
    assert!(!preview.overflow.kinds.bytes);
}

#[test]
fn test_reference_blocks_match_by_index() {
    let mut model = test_model(budget_settings(), "one\n\ntwo");
    update(
        &mut model,
        Msg::Script(ScriptMsg::LoadReference {
            name: "orig.txt".to_string(),
            text: "one\n\nt".to_string(),
        }),
    );
    let script = model.script.as_ref().unwrap();
    assert!(!script.blocks[0].is_overflowing);
    assert!(script.blocks[1].overflow.bytes);
    assert_eq!(model.overflowing_count(), 1);
}

#[test]
fn test_block_without_reference_is_not_checked() {
    let mut model = test_model(budget_settings(), "a\n\nextra block");
    update(
        &mut model,
        Msg::Script(ScriptMsg::LoadReference {
            name: "orig.txt".to_string(),
            text: "a".to_string(),
        }),
    );
    assert_eq!(model.overflowing_count(), 0);
}
