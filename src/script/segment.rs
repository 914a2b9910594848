//! Block segmentation
//!
//! Splits a raw script into the blocks that are previewed independently.

use std::borrow::Cow;

/// How a script is split into blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SegmentationMode {
    /// The whole script is a single block
    #[default]
    Whole,
    /// Every non-blank line is a block
    PerLine,
    /// Runs of text separated by one or more blank lines
    BlankLineRun,
    /// Split on each literal in order; the separator stays with the block before it
    CustomSeparators(Vec<String>),
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Split raw script text into block contents
pub fn split_blocks(raw: &str, mode: &SegmentationMode) -> Vec<String> {
    match mode {
        SegmentationMode::Whole => {
            if is_blank(raw) {
                Vec::new()
            } else {
                vec![raw.to_string()]
            }
        }
        SegmentationMode::PerLine => raw
            .lines()
            .filter(|line| !is_blank(line))
            .map(str::to_string)
            .collect(),
        SegmentationMode::BlankLineRun => split_blank_line_runs(raw),
        SegmentationMode::CustomSeparators(separators) => split_on_separators(raw, separators),
    }
}

fn split_blank_line_runs(raw: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if is_blank(line) {
            if !run.is_empty() {
                blocks.push(run.join("\n"));
                run.clear();
            }
        } else {
            run.push(line);
        }
    }
    if !run.is_empty() {
        blocks.push(run.join("\n"));
    }

    blocks
}

fn split_on_separators(raw: &str, separators: &[String]) -> Vec<String> {
    let mut fragments = vec![raw.to_string()];

    for separator in separators.iter().filter(|s| !s.is_empty()) {
        let mut next = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            let mut parts = fragment.split(separator.as_str()).peekable();
            while let Some(part) = parts.next() {
                if parts.peek().is_some() {
                    next.push(format!("{}{}\n", part, separator));
                } else {
                    next.push(part.to_string());
                }
            }
        }
        fragments = next;
    }

    fragments
        .into_iter()
        .map(|fragment| fragment.trim_start_matches(['\r', '\n']).to_string())
        .filter(|fragment| !is_blank(fragment))
        .collect()
}

/// Serialize block contents back into a script
///
/// Custom-separator blocks already carry their separator and newline, so
/// they are concatenated as-is.
pub fn join_blocks<S: AsRef<str>>(contents: &[S], mode: &SegmentationMode) -> String {
    let parts = contents.iter().map(AsRef::as_ref);
    match mode {
        SegmentationMode::Whole | SegmentationMode::CustomSeparators(_) => parts.collect(),
        SegmentationMode::PerLine => parts.collect::<Vec<_>>().join("\n"),
        SegmentationMode::BlankLineRun => parts.collect::<Vec<_>>().join("\n\n"),
    }
}

/// Remove retained separators (and the newline that follows each) from block content
pub fn strip_separators<'a>(content: &'a str, separators: &[String]) -> Cow<'a, str> {
    let separators: Vec<&str> = separators
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if !separators.iter().any(|sep| content.contains(*sep)) {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    'scan: while !rest.is_empty() {
        for separator in &separators {
            if let Some(after) = rest.strip_prefix(*separator) {
                rest = after
                    .strip_prefix("\r\n")
                    .or_else(|| after.strip_prefix('\n'))
                    .unwrap_or(after);
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seps(list: &[&str]) -> SegmentationMode {
        SegmentationMode::CustomSeparators(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_per_line_skips_blank_lines() {
        let blocks = split_blocks("one\r\n\r\ntwo\n   \nthree", &SegmentationMode::PerLine);
        assert_eq!(blocks, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_blank_line_runs_keep_inner_lines() {
        let blocks = split_blocks("a\nb\n\n\nc", &SegmentationMode::BlankLineRun);
        assert_eq!(blocks, vec!["a\nb", "c"]);
    }

    #[test]
    fn test_custom_separator_retained() {
        let blocks = split_blocks("Hi<END>There<END>", &seps(&["<END>"]));
        assert_eq!(blocks, vec!["Hi<END>\n", "There<END>\n"]);
    }

    #[test]
    fn test_custom_separators_applied_in_order() {
        let blocks = split_blocks("a[P]b[E]c", &seps(&["[E]", "[P]"]));
        assert_eq!(blocks, vec!["a[P]\n", "b[E]\n", "c"]);
    }

    #[test]
    fn test_strip_separators() {
        let stripped = strip_separators("Hi<END>\n", &["<END>".to_string()]);
        assert_eq!(stripped, "Hi");
        let untouched = strip_separators("plain", &["<END>".to_string()]);
        assert!(matches!(untouched, Cow::Borrowed(_)));
    }

    #[test]
    fn test_whole_mode_single_block() {
        assert_eq!(split_blocks("a\n\nb", &SegmentationMode::Whole), vec!["a\n\nb"]);
        assert!(split_blocks("  \n", &SegmentationMode::Whole).is_empty());
    }
}
