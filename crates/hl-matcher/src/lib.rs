//! Pattern compilation and match finding for highlight rules.
//!
//! This crate turns a rule's pattern and options into a [`CompiledMatcher`]
//! and finds the ranges it highlights in a document's text.
//!
//! # Overview
//!
//! - [`compile`]: literal or regex pattern + case sensitivity into a matcher
//! - [`find_matches`]: left-to-right scan with zero-width protection and
//!   whole-word filtering
//! - [`WordPolicy`]: decides what counts as a word character, either from a
//!   language word pattern ([`LanguageWords`]) or from separator characters
//!   ([`SeparatorSet`])
//! - [`WordPatternCache`]: compiled language patterns keyed by language and
//!   configuration source
//!
//! # Example
//!
//! ```
//! use hl_core::{RuleOptions, TextRange};
//! use hl_matcher::{compile, find_matches, SeparatorSet, WordPolicy};
//!
//! let options = RuleOptions { whole_word: true, ..RuleOptions::default() };
//! let matcher = compile("cat", options).unwrap();
//! let separators = SeparatorSet::default();
//! let ranges = find_matches(
//!     "The Cat sat in the CATalog",
//!     &matcher,
//!     &WordPolicy::Separators(&separators),
//! );
//! assert_eq!(ranges, vec![TextRange::new(4, 7)]);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod compile;
mod error;
mod matches;
mod words;

pub use compile::{CompiledMatcher, compile};
pub use error::PatternError;
pub use matches::find_matches;
pub use words::{LanguageWords, SeparatorSet, WordPatternCache, WordPatternSource, WordPolicy};
