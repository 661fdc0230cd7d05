//! Scanning text for rule matches.

use hl_core::TextRange;

use crate::compile::CompiledMatcher;
use crate::words::WordPolicy;

/// Finds every non-overlapping match of `matcher` in `text`.
///
/// Zero-width matches never produce a range; the scan steps over one
/// character and continues. When the matcher requires whole words, each
/// candidate is checked against `words` and dropped if it fails.
///
/// Ranges are byte offsets, ascending.
#[must_use]
pub fn find_matches(text: &str, matcher: &CompiledMatcher, words: &WordPolicy<'_>) -> Vec<TextRange> {
    let regex = matcher.regex();
    let mut ranges = Vec::new();
    let mut at = 0;

    while at <= text.len() {
        let Some(m) = regex.find_at(text, at) else {
            break;
        };

        if m.start() == m.end() {
            at = next_char_boundary(text, m.end());
            continue;
        }

        let range = TextRange::new(m.start(), m.end());
        if !matcher.whole_word() || words.is_whole_word(text, range) {
            ranges.push(range);
        }
        at = m.end();
    }

    ranges
}

fn next_char_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| offset + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::words::{LanguageWords, SeparatorSet};
    use hl_core::RuleOptions;

    fn scan(text: &str, pattern: &str, options: RuleOptions) -> Vec<TextRange> {
        let matcher = compile(pattern, options).unwrap();
        let separators = SeparatorSet::default();
        find_matches(text, &matcher, &WordPolicy::Separators(&separators))
    }

    fn whole_word() -> RuleOptions {
        RuleOptions {
            whole_word: true,
            ..RuleOptions::default()
        }
    }

    #[test]
    fn test_case_insensitive_literal() {
        let ranges = scan("The Cat sat in the CATalog", "cat", RuleOptions::default());
        assert_eq!(ranges, vec![TextRange::new(4, 7), TextRange::new(19, 22)]);
    }

    #[test]
    fn test_whole_word_drops_embedded_matches() {
        let ranges = scan("The Cat sat in the CATalog", "cat", whole_word());
        assert_eq!(ranges, vec![TextRange::new(4, 7)]);
    }

    #[test]
    fn test_whole_word_at_text_edges() {
        assert_eq!(scan("cat", "cat", whole_word()), vec![TextRange::new(0, 3)]);
        assert_eq!(
            scan("(cat)\ncat.", "cat", whole_word()),
            vec![TextRange::new(1, 4), TextRange::new(6, 9)]
        );
    }

    #[test]
    fn test_zero_width_matches_are_skipped() {
        let options = RuleOptions {
            use_regex: true,
            ..RuleOptions::default()
        };
        assert_eq!(scan("bbb", "a*", options), Vec::new());
        assert_eq!(scan("baab", "a*", options), vec![TextRange::new(1, 3)]);
        assert_eq!(scan("", "a*", options), Vec::new());
        assert_eq!(scan("x\ny", "^", options), Vec::new());
    }

    #[test]
    fn test_zero_width_steps_over_multibyte_chars() {
        let options = RuleOptions {
            use_regex: true,
            ..RuleOptions::default()
        };
        assert_eq!(scan("é€x", "x*", options), vec![TextRange::new(5, 6)]);
    }

    #[test]
    fn test_matches_do_not_overlap() {
        assert_eq!(
            scan("aaaa", "aa", RuleOptions::default()),
            vec![TextRange::new(0, 2), TextRange::new(2, 4)]
        );
    }

    #[test]
    fn test_unicode_offsets_are_bytes() {
        let ranges = scan("héllo wörld", "wörld", RuleOptions::default());
        assert_eq!(ranges, vec![TextRange::new(7, 13)]);
    }

    #[test]
    fn test_language_word_policy() {
        let matcher = compile("var", whole_word()).unwrap();
        let words = LanguageWords::compile(r"[A-Za-z_][A-Za-z0-9_-]*").unwrap();
        let ranges = find_matches("my-var var", &matcher, &WordPolicy::Language(&words));
        assert_eq!(ranges, vec![TextRange::new(7, 10)]);
    }

    #[test]
    fn test_every_whole_word_result_passes_the_check() {
        let separators = SeparatorSet::default();
        let policy = WordPolicy::Separators(&separators);
        let text = "ab a_b ab.ab xab abx ab";
        let matcher = compile("ab", whole_word()).unwrap();
        let ranges = find_matches(text, &matcher, &policy);
        assert!(!ranges.is_empty());
        for range in &ranges {
            assert!(policy.is_whole_word(text, *range));
        }
        assert_eq!(ranges.len(), 4);
    }
}
