//! Domain types for hlscope.
//!
//! # Module Organization
//!
//! - [`location`] - Document and folder identities
//! - [`range`] - Byte ranges and selections
//! - [`rule`] - Rule ids, options, and drafts
//! - [`scope`] - Scopes and scope identities
//!
//! All public types are re-exported at this module level and at the crate
//! root:
//!
//! ```
//! use hl_core::{Location, RuleDraft, Scope, ScopeKey, TextRange};
//! ```

pub mod location;
pub mod range;
pub mod rule;
pub mod scope;

pub use location::Location;
pub use range::{Selection, TextRange};
pub use rule::{RuleDraft, RuleId, RuleOption, RuleOptions};
pub use scope::{Scope, ScopeKey, ScopeOption};
