//! Whole-word policies.
//!
//! A match is "whole word" when it is not glued to word characters on either
//! side. What a word character is depends on the document: a language may
//! publish a word pattern (one regex describing a single word token), and
//! otherwise a set of separator characters decides.

use std::sync::Arc;

use hl_core::config::DEFAULT_WORD_SEPARATORS;
use hl_core::{FxHashMap, TextRange};
use regex::Regex;
use tracing::{debug, warn};

/// Separator-based word boundaries.
///
/// Whitespace and every character in the set are non-word characters;
/// anything else is part of a word.
///
/// # Examples
///
/// ```
/// use hl_matcher::SeparatorSet;
///
/// let set = SeparatorSet::default();
/// assert!(set.is_word_char('a'));
/// assert!(set.is_word_char('_'));
/// assert!(!set.is_word_char('.'));
/// assert!(!set.is_word_char('\t'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorSet {
    separators: Box<str>,
}

impl SeparatorSet {
    /// Creates a set from a string of separator characters.
    #[must_use]
    pub fn new(separators: &str) -> Self {
        Self {
            separators: separators.into(),
        }
    }

    /// Returns `true` if `c` belongs to a word.
    #[inline]
    #[must_use]
    pub fn is_word_char(&self, c: char) -> bool {
        !c.is_whitespace() && !self.separators.contains(c)
    }
}

impl Default for SeparatorSet {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_SEPARATORS)
    }
}

/// A compiled language word pattern.
#[derive(Debug, Clone)]
pub struct LanguageWords {
    regex: Regex,
}

impl LanguageWords {
    /// Compiles a language word pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex error when the pattern is not valid.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Finds the word token containing `offset`, searching only the line
    /// that holds it.
    #[must_use]
    pub fn word_range_at(&self, text: &str, offset: usize) -> Option<TextRange> {
        if offset > text.len() || !text.is_char_boundary(offset) {
            return None;
        }
        let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
        let line = &text[line_start..line_end];
        let column = offset - line_start;

        self.regex
            .find_iter(line)
            .take_while(|m| m.start() <= column)
            .find(|m| column < m.end())
            .map(|m| TextRange::new(line_start + m.start(), line_start + m.end()))
    }
}

/// The word-boundary rule in force for one document.
#[derive(Debug, Clone, Copy)]
pub enum WordPolicy<'a> {
    /// The document's language supplied a word pattern.
    Language(&'a LanguageWords),
    /// Fall back to separator characters.
    Separators(&'a SeparatorSet),
}

impl WordPolicy<'_> {
    /// Returns `true` if `range` is a whole word in `text`.
    #[must_use]
    pub fn is_whole_word(&self, text: &str, range: TextRange) -> bool {
        match self {
            Self::Language(words) => words.word_range_at(text, range.start) == Some(range),
            Self::Separators(set) => {
                let before = text[..range.start].chars().next_back();
                let after = text[range.end..].chars().next();
                before.is_none_or(|c| !set.is_word_char(c))
                    && after.is_none_or(|c| !set.is_word_char(c))
            }
        }
    }
}

/// A language word pattern as published by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordPatternSource {
    /// Where the pattern came from (an extension id, a config path, ...).
    pub source: String,
    /// The regex describing one word token.
    pub pattern: String,
}

/// Compiled language word patterns keyed by `(language, source)`.
///
/// Failed compilations are cached as "no pattern" so a broken definition is
/// reported once and the separator fallback is used from then on.
#[derive(Debug, Default)]
pub struct WordPatternCache {
    entries: FxHashMap<(String, String), Option<Arc<LanguageWords>>>,
}

impl WordPatternCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled pattern for `language_id` from `source`,
    /// compiling it on first use.
    pub fn resolve(
        &mut self,
        language_id: &str,
        source: &WordPatternSource,
    ) -> Option<Arc<LanguageWords>> {
        let key = (language_id.to_owned(), source.source.clone());
        if let Some(cached) = self.entries.get(&key) {
            return cached.clone();
        }

        let compiled = match LanguageWords::compile(&source.pattern) {
            Ok(words) => {
                debug!(language = language_id, source = %source.source, "Compiled word pattern");
                Some(Arc::new(words))
            }
            Err(e) => {
                warn!(
                    language = language_id,
                    source = %source.source,
                    error = %e,
                    "Unusable word pattern, falling back to separators"
                );
                None
            }
        };
        self.entries.insert(key, compiled.clone());
        compiled
    }

    /// Number of cached entries, including failures.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been cached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pattern: &str) -> WordPatternSource {
        WordPatternSource {
            source: "ext.lang".to_owned(),
            pattern: pattern.to_owned(),
        }
    }

    #[test]
    fn test_separator_policy() {
        let set = SeparatorSet::default();
        let policy = WordPolicy::Separators(&set);
        let text = "foo.bar baz_qux";
        assert!(policy.is_whole_word(text, TextRange::new(0, 3)));
        assert!(policy.is_whole_word(text, TextRange::new(4, 7)));
        assert!(!policy.is_whole_word(text, TextRange::new(8, 11)));
        assert!(policy.is_whole_word(text, TextRange::new(8, 15)));
    }

    #[test]
    fn test_custom_separators() {
        let set = SeparatorSet::new("-");
        assert!(!set.is_word_char('-'));
        assert!(set.is_word_char('.'));
    }

    #[test]
    fn test_word_range_at() {
        let words = LanguageWords::compile(r"[A-Za-z_][A-Za-z0-9_-]*").unwrap();
        let text = "let my-var = 1;\nnext_line";
        assert_eq!(words.word_range_at(text, 4), Some(TextRange::new(4, 10)));
        assert_eq!(words.word_range_at(text, 7), Some(TextRange::new(4, 10)));
        assert_eq!(words.word_range_at(text, 11), None);
        assert_eq!(words.word_range_at(text, 16), Some(TextRange::new(16, 25)));
    }

    #[test]
    fn test_language_policy_uses_word_token() {
        let words = LanguageWords::compile(r"[A-Za-z_][A-Za-z0-9_-]*").unwrap();
        let policy = WordPolicy::Language(&words);
        let text = "my-var var";
        // `var` inside `my-var` is not a whole token in this language.
        assert!(!policy.is_whole_word(text, TextRange::new(3, 6)));
        assert!(policy.is_whole_word(text, TextRange::new(7, 10)));
        assert!(policy.is_whole_word(text, TextRange::new(0, 6)));
    }

    #[test]
    fn test_cache_compiles_once() {
        let mut cache = WordPatternCache::new();
        let first = cache.resolve("rust", &source(r"\w+")).unwrap();
        let second = cache.resolve("rust", &source(r"\w+")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_remembers_failures() {
        let mut cache = WordPatternCache::new();
        assert!(cache.resolve("weird", &source("(")).is_none());
        assert!(cache.resolve("weird", &source("(")).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keys_by_source() {
        let mut cache = WordPatternCache::new();
        let other = WordPatternSource {
            source: "other.ext".to_owned(),
            pattern: r"\w+".to_owned(),
        };
        cache.resolve("rust", &source(r"\w+"));
        cache.resolve("rust", &other);
        assert_eq!(cache.len(), 2);
    }
}
