//! Error types for the hl-engine crate.
//!
//! Every variant is user-facing and describes itself in one message. None
//! of them leave a rule or bucket partially mutated: validation happens
//! before any state changes.

use hl_core::{Location, RuleId};
use hl_matcher::PatternError;
use hl_scanner::ScanError;

/// Errors returned by engine operations.
///
/// # Examples
///
/// ```
/// use hl_engine::EngineError;
///
/// let err = EngineError::validation("color must not be empty");
/// assert!(err.is_user_error());
/// assert_eq!(err.to_string(), "color must not be empty");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A required field was empty.
    #[error("{0}")]
    Validation(String),

    /// The pattern does not compile under the rule's options.
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    /// The file filter contains a glob that does not compile.
    #[error(transparent)]
    InvalidFilter(ScanError),

    /// No rule with this id exists.
    #[error("no highlight rule with id {0}")]
    RuleNotFound(RuleId),

    /// Navigation was requested for a rule without matches.
    #[error("no matches for {0}")]
    NoMatches(RuleId),

    /// The host could not open a navigation target.
    #[error("could not open {0}")]
    DocumentUnavailable(Location),

    /// The engine was created outside a tokio runtime.
    #[error("the highlight engine requires a tokio runtime")]
    NoRuntime,
}

impl EngineError {
    /// Creates a new [`EngineError::Validation`] error.
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns `true` for errors caused by user input rather than engine
    /// state.
    #[inline]
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidPattern(_) | Self::InvalidFilter(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_error_converts() {
        let err: EngineError = PatternError::invalid("(", "unclosed group").into();
        assert!(err.is_user_error());
        assert!(err.to_string().contains("unclosed group"));
    }

    #[test]
    fn test_rule_not_found_display() {
        let err = EngineError::RuleNotFound(RuleId::new(4));
        assert_eq!(err.to_string(), "no highlight rule with id rule-4");
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_no_matches_display() {
        assert_eq!(
            EngineError::NoMatches(RuleId::new(2)).to_string(),
            "no matches for rule-2"
        );
    }
}
