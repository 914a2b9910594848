//! Benchmarks for tokenizing and laying out blocks
//!
//! Run with: cargo bench layout

mod support;
use support::{fixed_font, make_script};

use boxfit::layout::{layout_block, LayoutParams, WrapMode};
use boxfit::settings::{AppSettings, ColorTag};
use boxfit::tags::TagSet;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn tagged_settings() -> AppSettings {
    AppSettings {
        color_tags: vec![ColorTag {
            opening_tag: "<red>".to_string(),
            closing_tag: "</red>".to_string(),
            ..ColorTag::default()
        }],
        hide_tags_in_preview: true,
        tag_patterns_to_hide: vec![r"\{[^}]*\}".to_string()],
        ..AppSettings::default()
    }
}

// ============================================================================
// Tokenizing
// ============================================================================

#[divan::bench(args = [1, 10, 100])]
fn tokenize_blocks(bencher: divan::Bencher, blocks: usize) {
    let tags = TagSet::from_settings(&tagged_settings());
    let text = make_script(blocks);
    bencher.bench(|| divan::black_box(tags.tokenize(divan::black_box(&text))));
}

#[divan::bench]
fn compile_tag_set(bencher: divan::Bencher) {
    let settings = tagged_settings();
    bencher.bench(|| divan::black_box(TagSet::from_settings(&settings)));
}

// ============================================================================
// Layout
// ============================================================================

fn bench_dialogue(bencher: divan::Bencher, wrap: WrapMode) {
    let settings = tagged_settings();
    let font = fixed_font(&settings);
    let tokens = TagSet::from_settings(&settings)
        .tokenize(&make_script(3))
        .tokens;
    let params = LayoutParams {
        available_width: 160.0,
        wrap,
        ..LayoutParams::default()
    };
    bencher.bench(|| divan::black_box(layout_block(&tokens, &font, &params)));
}

#[divan::bench]
fn layout_dialogue_word_wrap(bencher: divan::Bencher) {
    bench_dialogue(bencher, WrapMode::Word);
}

#[divan::bench]
fn layout_dialogue_char_wrap(bencher: divan::Bencher) {
    bench_dialogue(bencher, WrapMode::Char);
}

#[divan::bench(args = [100, 1000, 10000])]
fn layout_long_block(bencher: divan::Bencher, chars: usize) {
    let settings = AppSettings::default();
    let font = fixed_font(&settings);
    let text = "lorem ipsum dolor ".repeat(chars / 18 + 1);
    let tokens = TagSet::default().tokenize(&text[..chars]).tokens;
    let params = LayoutParams {
        available_width: 240.0,
        ..LayoutParams::default()
    };
    bencher.bench(|| divan::black_box(layout_block(&tokens, &font, &params)));
}
