//! Highlight rule identity, options, and drafts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque identifier for a highlight rule.
///
/// # Examples
///
/// ```
/// use hl_core::RuleId;
///
/// let id = RuleId::new(7);
/// assert_eq!(id.to_string(), "rule-7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(pub u64);

impl RuleId {
    /// Creates a rule id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule-{}", self.0)
    }
}

/// The three independent matching switches of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RuleOptions {
    /// Match letter case exactly.
    pub case_sensitive: bool,
    /// Only keep matches not adjacent to word characters.
    pub whole_word: bool,
    /// Interpret the pattern as a regular expression.
    pub use_regex: bool,
}

/// Names one of the [`RuleOptions`] switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOption {
    /// [`RuleOptions::case_sensitive`].
    CaseSensitive,
    /// [`RuleOptions::whole_word`].
    WholeWord,
    /// [`RuleOptions::use_regex`].
    UseRegex,
}

impl RuleOptions {
    /// Reads one switch.
    #[inline]
    #[must_use]
    pub const fn get(self, option: RuleOption) -> bool {
        match option {
            RuleOption::CaseSensitive => self.case_sensitive,
            RuleOption::WholeWord => self.whole_word,
            RuleOption::UseRegex => self.use_regex,
        }
    }

    /// Returns a copy with one switch changed.
    #[inline]
    #[must_use]
    pub const fn with(mut self, option: RuleOption, value: bool) -> Self {
        match option {
            RuleOption::CaseSensitive => self.case_sensitive = value,
            RuleOption::WholeWord => self.whole_word = value,
            RuleOption::UseRegex => self.use_regex = value,
        }
        self
    }
}

/// User input for a new rule, before validation and scope resolution.
///
/// # Examples
///
/// ```
/// use hl_core::{RuleDraft, RuleOptions};
///
/// let draft = RuleDraft::new("TODO", "#ffcc00").with_filter("*.rs, *.md");
/// assert_eq!(draft.options, RuleOptions::default());
/// assert_eq!(draft.file_filter.as_deref(), Some("*.rs, *.md"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleDraft {
    /// Literal text or regular expression.
    pub pattern: String,
    /// Highlight color.
    pub color: String,
    /// Matching switches.
    pub options: RuleOptions,
    /// Optional base-name glob filter.
    pub file_filter: Option<String>,
}

impl RuleDraft {
    /// Creates a draft with default options and no filter.
    #[must_use]
    pub fn new(pattern: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            color: color.into(),
            options: RuleOptions::default(),
            file_filter: None,
        }
    }

    /// Sets the matching switches.
    #[must_use]
    pub const fn with_options(mut self, options: RuleOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the file filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.file_filter = Some(filter.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_get_and_with() {
        let options = RuleOptions::default().with(RuleOption::UseRegex, true);
        assert!(options.get(RuleOption::UseRegex));
        assert!(!options.get(RuleOption::CaseSensitive));
        assert!(!options.with(RuleOption::UseRegex, false).use_regex);
    }

    #[test]
    fn test_rule_id_ordering() {
        assert!(RuleId::new(1) < RuleId::new(2));
        assert_eq!(RuleId::new(3).as_u64(), 3);
    }

    #[test]
    fn test_draft_serialization() {
        let draft = RuleDraft::new("cat", "#00c4ff55");
        let json = serde_json::to_string(&draft).unwrap();
        let parsed: RuleDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, draft);
    }
}
