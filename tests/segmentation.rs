//! Block segmentation and script editing tests

use boxfit::script::{join_blocks, split_blocks, strip_separators, Script, ScriptId, SegmentationMode};

fn custom(separators: &[&str]) -> SegmentationMode {
    SegmentationMode::CustomSeparators(separators.iter().map(|s| s.to_string()).collect())
}

// ============================================================================
// Splitting
// ============================================================================

#[test]
fn test_blank_line_runs_separate_blocks() {
    let blocks = split_blocks("Hello\n\nWorld\n\n\nFoo", &SegmentationMode::BlankLineRun);
    assert_eq!(blocks, vec!["Hello", "World", "Foo"]);
}

#[test]
fn test_blank_line_runs_keep_multiline_blocks() {
    let raw = "first line\nsecond line\n\nnext";
    let blocks = split_blocks(raw, &SegmentationMode::BlankLineRun);
    assert_eq!(blocks, vec!["first line\nsecond line", "next"]);
}

#[test]
fn test_whitespace_only_lines_count_as_blank() {
    let blocks = split_blocks("A\n   \t\nB", &SegmentationMode::BlankLineRun);
    assert_eq!(blocks, vec!["A", "B"]);
}

#[test]
fn test_per_line_skips_blank_lines() {
    let blocks = split_blocks("one\n\ntwo\r\n  three", &SegmentationMode::PerLine);
    assert_eq!(blocks, vec!["one", "two", "  three"]);
}

#[test]
fn test_custom_separator_stays_with_preceding_block() {
    let blocks = split_blocks("A[END]B[END]C", &custom(&["[END]"]));
    assert_eq!(blocks, vec!["A[END]\n", "B[END]\n", "C"]);
}

#[test]
fn test_custom_separators_apply_in_order() {
    let blocks = split_blocks("a<p>b<w>c", &custom(&["<p>", "<w>"]));
    assert_eq!(blocks, vec!["a<p>\n", "b<w>\n", "c"]);
}

#[test]
fn test_custom_separator_at_end_leaves_no_empty_block() {
    let blocks = split_blocks("A[END]\n", &custom(&["[END]"]));
    assert_eq!(blocks, vec!["A[END]\n"]);
}

#[test]
fn test_whole_mode_is_one_block() {
    assert_eq!(
        split_blocks("a\n\nb", &SegmentationMode::Whole),
        vec!["a\n\nb"]
    );
    assert!(split_blocks(" \n ", &SegmentationMode::Whole).is_empty());
}

#[test]
fn test_strip_separators_removes_separator_and_newline() {
    let separators = vec!["[END]".to_string()];
    assert_eq!(strip_separators("Hello[END]\n", &separators), "Hello");
    assert_eq!(strip_separators("a[END]\r\nb", &separators), "ab");
    assert_eq!(strip_separators("plain", &separators), "plain");
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_segmentation_round_trip_is_stable() {
    let cases = [
        (SegmentationMode::BlankLineRun, "Hi\nthere\n\n\nSecond\n\nThird\n"),
        (SegmentationMode::PerLine, "a\nb\n\n\nc"),
        (custom(&["[END]"]), "One[END]\nTwo[END]Three"),
        (SegmentationMode::Whole, "all\n\nof it"),
    ];
    for (mode, raw) in cases {
        let blocks = split_blocks(raw, &mode);
        let joined = join_blocks(&blocks, &mode);
        assert_eq!(split_blocks(&joined, &mode), blocks, "mode {:?}", mode);
    }
}

// ============================================================================
// Script
// ============================================================================

#[test]
fn test_script_blocks_are_indexed_in_order() {
    let script = Script::new(
        ScriptId(1),
        "s.txt",
        "a\n\nb\n\nc",
        &SegmentationMode::BlankLineRun,
    );
    let indices: Vec<usize> = script.blocks.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(script.block(1).unwrap().content, "b");
}

#[test]
fn test_edits_survive_resegmentation_after_commit() {
    let mut script = Script::new(
        ScriptId(1),
        "s.txt",
        "a\n\nb",
        &SegmentationMode::BlankLineRun,
    );
    assert!(script.edit_block(1, "changed"));
    assert!(!script.edit_block(5, "missing"));

    script.commit_edits(&SegmentationMode::BlankLineRun);
    assert_eq!(script.raw_text, "a\n\nchanged");

    script.resegment(&SegmentationMode::PerLine);
    let contents: Vec<&str> = script.blocks.iter().map(|b| b.content.as_str()).collect();
    assert_eq!(contents, vec!["a", "changed"]);
}

#[test]
fn test_to_text_keeps_custom_separators() {
    let mode = custom(&["[END]"]);
    let script = Script::new(ScriptId(2), "s.txt", "A[END]B", &mode);
    assert_eq!(script.to_text(&mode), "A[END]\nB");
}
