//! Rule storage keyed by scope.
//!
//! [`RuleStore`] owns every [`Rule`] in a flat id index and groups ids into
//! buckets by normalized `(scope, target)`. Every mutation validates before
//! touching stored state, so a failed update leaves the rule unchanged.

use hl_core::{
    FxHashMap, Location, RuleDraft, RuleId, RuleOption, RuleOptions, Scope, ScopeKey,
};
use hl_matcher::{CompiledMatcher, compile};
use hl_scanner::FileFilter;
use smallvec::SmallVec;
use tracing::debug;

use crate::decoration::{Decoration, DecorationStyle};
use crate::error::EngineError;
use crate::resolver::ScopeResolver;

type BucketKey = (Scope, String);

/// A highlight rule and everything derived from it.
#[derive(Debug)]
pub struct Rule {
    id: RuleId,
    pattern: String,
    color: String,
    options: RuleOptions,
    key: ScopeKey,
    filter: Option<FileFilter>,
    matcher: CompiledMatcher,
    decoration: Decoration,
    revision: u64,
}

impl Rule {
    /// The rule's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Literal text or regular expression.
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Highlight color.
    #[inline]
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Matching switches.
    #[inline]
    #[must_use]
    pub const fn options(&self) -> RuleOptions {
        self.options
    }

    /// Scope and target.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &ScopeKey {
        &self.key
    }

    /// File-name filter, if any.
    #[inline]
    #[must_use]
    pub const fn filter(&self) -> Option<&FileFilter> {
        self.filter.as_ref()
    }

    /// The compiled pattern.
    #[inline]
    #[must_use]
    pub const fn matcher(&self) -> &CompiledMatcher {
        &self.matcher
    }

    /// The rule's decoration.
    #[inline]
    #[must_use]
    pub const fn decoration(&self) -> &Decoration {
        &self.decoration
    }

    /// Bumped on every change that affects matching.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if this rule highlights `document`.
    ///
    /// The file filter narrows folder scopes only; a document-scoped rule
    /// always applies to its own document.
    #[must_use]
    pub fn applies_to(&self, document: &Location) -> bool {
        if !self.key.covers(document) {
            return false;
        }
        match (&self.filter, self.key.scope) {
            (Some(filter), scope) if scope.is_folder() => document
                .file_name()
                .is_some_and(|name| filter.matches_name(name)),
            _ => true,
        }
    }

    /// Consumes the rule, yielding its decoration for disposal.
    #[must_use]
    pub fn into_decoration(self) -> Decoration {
        self.decoration
    }
}

/// All rules, indexed by id and bucketed by scope key.
///
/// # Invariants
///
/// - Every rule id is in exactly one bucket, the one for its key.
/// - Buckets are never empty; removing the last id removes the bucket.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: FxHashMap<RuleId, Rule>,
    buckets: FxHashMap<BucketKey, SmallVec<[RuleId; 4]>>,
    next_id: u64,
}

impl RuleStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `draft` and inserts it under `key`.
    ///
    /// `allocate` creates the rule's decoration and is only called once
    /// validation has passed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for an empty pattern or color,
    /// [`EngineError::InvalidPattern`] when the pattern does not compile,
    /// and [`EngineError::InvalidFilter`] for a bad file filter.
    pub fn create(
        &mut self,
        draft: RuleDraft,
        key: ScopeKey,
        filter_separators: &str,
        allocate: impl FnOnce(&DecorationStyle) -> Decoration,
    ) -> Result<RuleId, EngineError> {
        validate_pattern(&draft.pattern)?;
        validate_color(&draft.color)?;
        let matcher = compile(&draft.pattern, draft.options)?;
        let filter = parse_filter(draft.file_filter.as_deref(), filter_separators)?;

        let decoration = allocate(&DecorationStyle::from_color(&draft.color));
        self.next_id += 1;
        let id = RuleId::new(self.next_id);

        self.insert_into_bucket(&key, id);
        self.rules.insert(
            id,
            Rule {
                id,
                pattern: draft.pattern,
                color: draft.color,
                options: draft.options,
                key,
                filter,
                matcher,
                decoration,
                revision: 0,
            },
        );
        debug!(rule = %id, "Rule created");
        Ok(id)
    }

    /// Moves a rule to `key`.
    ///
    /// Returns `Ok(false)` when the rule is already there.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuleNotFound`] for an unknown id.
    pub fn change_scope(&mut self, id: RuleId, key: ScopeKey) -> Result<bool, EngineError> {
        let rule = self.rules.get_mut(&id).ok_or(EngineError::RuleNotFound(id))?;
        if rule.key.same_key(&key) {
            return Ok(false);
        }
        let old = std::mem::replace(&mut rule.key, key);
        rule.revision += 1;
        let new = rule.key.clone();

        self.remove_from_bucket(&old, id);
        self.insert_into_bucket(&new, id);
        debug!(rule = %id, from = %old, to = %new, "Rule moved");
        Ok(true)
    }

    /// Removes a rule from its bucket and the index.
    ///
    /// The caller owns the returned rule and must dispose its decoration.
    pub fn remove(&mut self, id: RuleId) -> Option<Rule> {
        let rule = self.rules.remove(&id)?;
        self.remove_from_bucket(&rule.key, id);
        debug!(rule = %id, "Rule removed");
        Some(rule)
    }

    /// Replaces the pattern.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id, an empty pattern, or one that does not
    /// compile under the rule's options. The rule is unchanged on failure.
    pub fn set_pattern(&mut self, id: RuleId, pattern: &str) -> Result<bool, EngineError> {
        let rule = self.rules.get_mut(&id).ok_or(EngineError::RuleNotFound(id))?;
        validate_pattern(pattern)?;
        if rule.pattern == pattern {
            return Ok(false);
        }
        let matcher = compile(pattern, rule.options)?;
        pattern.clone_into(&mut rule.pattern);
        rule.matcher = matcher;
        rule.revision += 1;
        Ok(true)
    }

    /// Replaces the color, returning the previous decoration for disposal.
    ///
    /// Returns `Ok(None)` when the color is unchanged.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id or an empty color.
    pub fn set_color(
        &mut self,
        id: RuleId,
        color: &str,
        allocate: impl FnOnce(&DecorationStyle) -> Decoration,
    ) -> Result<Option<Decoration>, EngineError> {
        let rule = self.rules.get_mut(&id).ok_or(EngineError::RuleNotFound(id))?;
        validate_color(color)?;
        if rule.color == color {
            return Ok(None);
        }
        let decoration = allocate(&DecorationStyle::from_color(color));
        color.clone_into(&mut rule.color);
        Ok(Some(std::mem::replace(&mut rule.decoration, decoration)))
    }

    /// Sets one matching switch.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id, or when the pattern does not compile under
    /// the new options; the option then keeps its previous value.
    pub fn set_option(
        &mut self,
        id: RuleId,
        option: RuleOption,
        value: bool,
    ) -> Result<bool, EngineError> {
        let rule = self.rules.get_mut(&id).ok_or(EngineError::RuleNotFound(id))?;
        if rule.options.get(option) == value {
            return Ok(false);
        }
        let options = rule.options.with(option, value);
        let matcher = compile(&rule.pattern, options)?;
        rule.options = options;
        rule.matcher = matcher;
        rule.revision += 1;
        Ok(true)
    }

    /// Replaces the file filter. Blank input clears it.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id or a filter with an invalid glob.
    pub fn set_filter(
        &mut self,
        id: RuleId,
        filter: Option<&str>,
        separators: &str,
    ) -> Result<bool, EngineError> {
        let rule = self.rules.get_mut(&id).ok_or(EngineError::RuleNotFound(id))?;
        let filter = parse_filter(filter, separators)?;
        if rule.filter == filter {
            return Ok(false);
        }
        rule.filter = filter;
        rule.revision += 1;
        Ok(true)
    }

    /// Looks up a rule.
    #[inline]
    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    /// Returns `true` if the id is stored.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: RuleId) -> bool {
        self.rules.contains_key(&id)
    }

    /// All rule ids in creation order.
    #[must_use]
    pub fn ids(&self) -> Vec<RuleId> {
        let mut ids: Vec<RuleId> = self.rules.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of rules.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when no rules exist.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Ids stored under `key`, or `None` when no such bucket exists.
    #[must_use]
    pub fn bucket(&self, key: &ScopeKey) -> Option<&[RuleId]> {
        self.buckets.get(&key.normalized()).map(SmallVec::as_slice)
    }

    /// Number of non-empty buckets.
    #[inline]
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Rules that highlight `document`, in creation order.
    #[must_use]
    pub fn rules_for(&self, document: &Location, resolver: &ScopeResolver) -> Vec<RuleId> {
        let mut ids: Vec<RuleId> = resolver
            .candidate_keys(document)
            .iter()
            .filter_map(|key| self.bucket(key))
            .flatten()
            .copied()
            .filter(|id| self.rules.get(id).is_some_and(|r| r.applies_to(document)))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn insert_into_bucket(&mut self, key: &ScopeKey, id: RuleId) {
        self.buckets.entry(key.normalized()).or_default().push(id);
    }

    fn remove_from_bucket(&mut self, key: &ScopeKey, id: RuleId) {
        let normalized = key.normalized();
        if let Some(bucket) = self.buckets.get_mut(&normalized) {
            bucket.retain(|member| *member != id);
            if bucket.is_empty() {
                self.buckets.remove(&normalized);
            }
        }
    }
}

fn validate_pattern(pattern: &str) -> Result<(), EngineError> {
    if pattern.is_empty() {
        return Err(EngineError::validation("pattern must not be empty"));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), EngineError> {
    if color.trim().is_empty() {
        return Err(EngineError::validation("color must not be empty"));
    }
    Ok(())
}

fn parse_filter(filter: Option<&str>, separators: &str) -> Result<Option<FileFilter>, EngineError> {
    match filter {
        Some(filter) => FileFilter::parse(filter, separators).map_err(EngineError::InvalidFilter),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoration::DecorationId;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn allocator() -> impl FnOnce(&DecorationStyle) -> Decoration {
        |style| Decoration::new(DecorationId(0), style.clone())
    }

    fn create(store: &mut RuleStore, draft: RuleDraft, key: ScopeKey) -> RuleId {
        store.create(draft, key, ",;", allocator()).unwrap()
    }

    #[test]
    fn test_create_inserts_into_bucket_and_index() {
        let mut store = RuleStore::new();
        let key = ScopeKey::folder(loc("file:///w"), false);
        let id = create(&mut store, RuleDraft::new("todo", "#ff0"), key.clone());
        assert_eq!(store.bucket(&key), Some(&[id][..]));
        assert_eq!(store.get(id).unwrap().pattern(), "todo");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_validates_before_allocating() {
        let mut store = RuleStore::new();
        let key = ScopeKey::document(loc("file:///w/a.rs"));
        let mut allocated = false;
        let mut attempt = |draft: RuleDraft| {
            store.create(draft, key.clone(), ",;", |style| {
                allocated = true;
                Decoration::new(DecorationId(0), style.clone())
            })
        };

        assert!(matches!(attempt(RuleDraft::new("", "#fff")), Err(EngineError::Validation(_))));
        assert!(matches!(attempt(RuleDraft::new("x", " ")), Err(EngineError::Validation(_))));
        let regex = RuleDraft::new("(", "#fff").with_options(RuleOptions {
            use_regex: true,
            ..RuleOptions::default()
        });
        assert!(matches!(attempt(regex), Err(EngineError::InvalidPattern(_))));
        let filter = RuleDraft::new("x", "#fff").with_filter("*.rs, a[");
        assert!(matches!(attempt(filter), Err(EngineError::InvalidFilter(_))));

        assert!(!allocated);
        assert!(store.is_empty());
        assert_eq!(store.bucket_count(), 0);
    }

    #[test]
    fn test_last_removal_drops_bucket() {
        let mut store = RuleStore::new();
        let key = ScopeKey::folder(loc("file:///w"), true);
        let a = create(&mut store, RuleDraft::new("a", "#fff"), key.clone());
        let b = create(&mut store, RuleDraft::new("b", "#fff"), key.clone());

        assert!(store.remove(a).is_some());
        assert_eq!(store.bucket(&key), Some(&[b][..]));
        assert!(store.remove(b).is_some());
        assert_eq!(store.bucket(&key), None);
        assert_eq!(store.bucket_count(), 0);
        assert!(store.remove(b).is_none());
    }

    #[test]
    fn test_change_scope_moves_between_buckets() {
        let mut store = RuleStore::new();
        let from = ScopeKey::document(loc("file:///w/a.rs"));
        let to = ScopeKey::folder(loc("file:///w"), false);
        let id = create(&mut store, RuleDraft::new("a", "#fff"), from.clone());

        assert!(!store.change_scope(id, from.clone()).unwrap());
        assert_eq!(store.get(id).unwrap().revision(), 0);

        assert!(store.change_scope(id, to.clone()).unwrap());
        assert_eq!(store.bucket(&from), None);
        assert_eq!(store.bucket(&to), Some(&[id][..]));
        assert_eq!(store.get(id).unwrap().key(), &to);
        assert_eq!(store.get(id).unwrap().revision(), 1);
    }

    #[test]
    fn test_change_scope_same_key_after_normalization() {
        let mut store = RuleStore::new();
        let id = create(
            &mut store,
            RuleDraft::new("a", "#fff"),
            ScopeKey::folder(loc("file:///w/"), false),
        );
        assert!(!store.change_scope(id, ScopeKey::folder(loc("file:///w"), false)).unwrap());
    }

    #[test]
    fn test_invalid_toggle_rolls_back() {
        let mut store = RuleStore::new();
        let id = create(
            &mut store,
            RuleDraft::new("(", "#fff"),
            ScopeKey::document(loc("file:///w/a.rs")),
        );
        let err = store.set_option(id, RuleOption::UseRegex, true).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPattern(_)));
        let rule = store.get(id).unwrap();
        assert!(!rule.options().use_regex);
        assert_eq!(rule.pattern(), "(");
        assert_eq!(rule.revision(), 0);
        assert!(rule.matcher().regex().is_match("f("));
    }

    #[test]
    fn test_invalid_pattern_update_keeps_previous() {
        let mut store = RuleStore::new();
        let draft = RuleDraft::new("a+", "#fff").with_options(RuleOptions {
            use_regex: true,
            ..RuleOptions::default()
        });
        let id = create(&mut store, draft, ScopeKey::document(loc("file:///w/a.rs")));
        assert!(store.set_pattern(id, "[").is_err());
        assert!(store.set_pattern(id, "").is_err());
        assert_eq!(store.get(id).unwrap().pattern(), "a+");
        assert!(store.set_pattern(id, "b+").unwrap());
        assert!(!store.set_pattern(id, "b+").unwrap());
        assert_eq!(store.get(id).unwrap().revision(), 1);
    }

    #[test]
    fn test_set_color_returns_old_decoration() {
        let mut store = RuleStore::new();
        let id = create(
            &mut store,
            RuleDraft::new("a", "#111"),
            ScopeKey::document(loc("file:///w/a.rs")),
        );
        assert!(store.set_color(id, "#111", allocator()).unwrap().is_none());
        let old = store
            .set_color(id, "#222", |style| Decoration::new(DecorationId(9), style.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(old.style().background, "#111");
        assert_eq!(store.get(id).unwrap().decoration().id(), DecorationId(9));
        assert!(store.set_color(id, "", allocator()).is_err());
    }

    #[test]
    fn test_rules_for_uses_scope_and_filter() {
        let mut store = RuleStore::new();
        let doc = loc("file:///w/src/a.rs");
        let document = create(&mut store, RuleDraft::new("a", "#fff"), ScopeKey::document(doc.clone()));
        let folder = create(
            &mut store,
            RuleDraft::new("b", "#fff").with_filter("*.rs"),
            ScopeKey::folder(loc("file:///w/src"), false),
        );
        let recursive = create(
            &mut store,
            RuleDraft::new("c", "#fff"),
            ScopeKey::folder(loc("file:///w"), true),
        );
        let filtered_out = create(
            &mut store,
            RuleDraft::new("d", "#fff").with_filter("*.md"),
            ScopeKey::folder(loc("file:///w"), true),
        );
        let elsewhere = create(
            &mut store,
            RuleDraft::new("e", "#fff"),
            ScopeKey::folder(loc("file:///w"), false),
        );

        let resolver = ScopeResolver::default();
        let ids = store.rules_for(&doc, &resolver);
        assert_eq!(ids, vec![document, folder, recursive]);
        assert!(!ids.contains(&filtered_out));
        assert!(!ids.contains(&elsewhere));
    }

    #[test]
    fn test_set_filter() {
        let mut store = RuleStore::new();
        let id = create(
            &mut store,
            RuleDraft::new("a", "#fff"),
            ScopeKey::folder(loc("file:///w"), false),
        );
        assert!(store.set_filter(id, Some("*.rs"), ",;").unwrap());
        assert!(!store.set_filter(id, Some(" *.rs "), ",;").unwrap());
        assert!(store.set_filter(id, Some("a["), ",;").is_err());
        assert_eq!(store.get(id).unwrap().filter().unwrap().as_str(), "*.rs");
        assert!(store.set_filter(id, None, ",;").unwrap());
        assert!(store.get(id).unwrap().filter().is_none());
    }
}
