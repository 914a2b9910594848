//! Pattern matching capability used by the tag processor
//!
//! Hide patterns come straight from user settings, so the regex engine is
//! kept behind the `Matcher` trait and every pattern is compiled with a
//! bounded program size.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

/// Compiled program size limit for user patterns
const PATTERN_SIZE_LIMIT: usize = 1 << 20;
/// Patterns are only applied to the first this-many bytes of a block
pub const MAX_PATTERN_INPUT: usize = 64 * 1024;

/// Something that can find spans in text
pub trait Matcher: std::fmt::Debug {
    /// Find the first non-empty match starting at or after `from`
    fn find(&self, text: &str, from: usize) -> Option<Range<usize>>;
}

/// Matches a user-supplied regular expression
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    /// Compile a pattern, rejecting invalid or oversized programs
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .size_limit(PATTERN_SIZE_LIMIT)
            .dfa_size_limit(PATTERN_SIZE_LIMIT)
            .build()?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Matcher for PatternMatcher {
    fn find(&self, text: &str, from: usize) -> Option<Range<usize>> {
        let mut from = from;
        let mut limit = text.len().min(MAX_PATTERN_INPUT);
        while !text.is_char_boundary(limit) {
            limit -= 1;
        }
        while from <= limit && text.is_char_boundary(from) {
            let found = self.regex.find_at(&text[..limit], from)?;
            if !found.is_empty() {
                return Some(found.range());
            }
            // Skip zero-width matches so they can never stall a scan
            from = found.start() + text[found.start()..].chars().next()?.len_utf8();
        }
        None
    }
}

/// Compile every pattern, skipping (and logging) the ones that fail
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Vec<PatternMatcher> {
    patterns
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.is_empty())
        .filter_map(|pattern| match PatternMatcher::compile(pattern) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                tracing::warn!("Skipping invalid hide pattern '{}': {}", pattern, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_skips_zero_width_matches() {
        let m = PatternMatcher::compile("x*").unwrap();
        assert_eq!(m.find("abxxc", 0), Some(2..4));
    }

    #[test]
    fn test_invalid_patterns_skipped() {
        let compiled = compile_patterns(&["<[^>]*>", "([unclosed", ""]);
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].as_str(), "<[^>]*>");
    }
}
