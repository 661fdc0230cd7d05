//! Read-only views of rules for side panels and the CLI.

use hl_core::{Location, RuleId, RuleOptions, Scope};
use serde::Serialize;

use crate::navigation::NavigationIndex;
use crate::store::Rule;

/// A rule's fields plus its match counts.
///
/// Local counts refer to the document the snapshot was taken for; global
/// counts span every document the rule has matches in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSnapshot {
    /// Rule id.
    pub id: RuleId,
    /// Literal text or regular expression.
    pub pattern: String,
    /// Highlight color.
    pub color: String,
    /// Matching switches.
    pub options: RuleOptions,
    /// Scope kind.
    pub scope: Scope,
    /// Document or folder the scope is anchored at.
    pub target: Location,
    /// File-name filter as entered.
    pub file_filter: Option<String>,
    /// Document the local counts refer to.
    pub document: Option<Location>,
    /// Matches in `document`.
    pub local_count: usize,
    /// 1-based selected match in `document`.
    pub local_index: Option<usize>,
    /// Matches across all documents.
    pub global_count: usize,
    /// 1-based index of the last visited match.
    pub global_index: Option<usize>,
    /// Matching revision.
    pub revision: u64,
}

impl RuleSnapshot {
    pub(crate) fn capture(rule: &Rule, index: &NavigationIndex, document: Option<&Location>) -> Self {
        let local = document.and_then(|d| index.stats(rule.id(), d));
        Self {
            id: rule.id(),
            pattern: rule.pattern().to_owned(),
            color: rule.color().to_owned(),
            options: rule.options(),
            scope: rule.key().scope,
            target: rule.key().target.clone(),
            file_filter: rule.filter().map(|f| f.as_str().to_owned()),
            document: document.cloned(),
            local_count: local.map_or(0, |s| s.count()),
            local_index: local.and_then(|s| s.current()),
            global_count: index.total(rule.id()),
            global_index: index.global_index(rule.id()),
            revision: rule.revision(),
        }
    }
}
