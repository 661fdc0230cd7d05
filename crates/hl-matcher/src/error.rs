//! Error types for the hl-matcher crate.

/// Errors raised while compiling a rule's pattern.
///
/// Both variants are user-correctable; callers compile before touching any
/// stored rule state so a failure never leaves a half-updated rule.
///
/// # Examples
///
/// ```
/// use hl_core::RuleOptions;
/// use hl_matcher::{compile, PatternError};
///
/// let options = RuleOptions { use_regex: true, ..RuleOptions::default() };
/// let err = compile("(", options).unwrap_err();
/// assert!(matches!(err, PatternError::Invalid { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The pattern was empty.
    #[error("pattern must not be empty")]
    Empty,

    /// The regular expression failed to compile.
    #[error("invalid regular expression '{pattern}': {message}")]
    Invalid {
        /// The rejected pattern.
        pattern: String,
        /// The compiler's message.
        message: String,
    },
}

impl PatternError {
    /// Creates a new [`PatternError::Invalid`] error.
    #[inline]
    pub fn invalid(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display_carries_message() {
        let err = PatternError::invalid("(", "unclosed group");
        let msg = err.to_string();
        assert!(msg.contains("'('"));
        assert!(msg.contains("unclosed group"));
    }

    #[test]
    fn test_empty_display() {
        assert_eq!(PatternError::Empty.to_string(), "pattern must not be empty");
    }
}
