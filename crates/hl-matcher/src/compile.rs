//! Turning a rule's pattern and options into a regex.

use hl_core::RuleOptions;
use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// A rule pattern ready for scanning.
///
/// Literal patterns are escaped before compilation, so both kinds share the
/// same scanning path.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    regex: Regex,
    whole_word: bool,
}

impl CompiledMatcher {
    /// The compiled expression.
    #[inline]
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether candidates must pass the whole-word check.
    #[inline]
    #[must_use]
    pub const fn whole_word(&self) -> bool {
        self.whole_word
    }
}

/// Compiles `pattern` under `options`.
///
/// # Errors
///
/// Returns [`PatternError::Empty`] for an empty pattern and
/// [`PatternError::Invalid`] when `use_regex` is set and the expression does
/// not compile. Literal patterns never fail once non-empty.
///
/// # Examples
///
/// ```
/// use hl_core::RuleOptions;
/// use hl_matcher::compile;
///
/// let matcher = compile("a.b", RuleOptions::default()).unwrap();
/// assert!(matcher.regex().is_match("xa.by"));
/// assert!(!matcher.regex().is_match("aXb"));
/// ```
pub fn compile(pattern: &str, options: RuleOptions) -> Result<CompiledMatcher, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }

    let source = if options.use_regex {
        pattern.to_owned()
    } else {
        regex::escape(pattern)
    };

    let regex = RegexBuilder::new(&source)
        .case_insensitive(!options.case_sensitive)
        .build()
        .map_err(|e| PatternError::invalid(pattern, e.to_string()))?;

    Ok(CompiledMatcher {
        regex,
        whole_word: options.whole_word,
    })
}
