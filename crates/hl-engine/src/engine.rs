//! The engine facade: rule operations, host events, and scope scans.
//!
//! All state sits behind one `parking_lot::Mutex`. Operations lock it, run
//! to completion, and release it before returning; the lock is never held
//! across an `.await`. Folder scans run as tokio tasks with enumeration and
//! reading in `spawn_blocking`, and report back through the same lock.

use std::sync::Arc;

use hl_core::{
    Config, EngineConfig, Location, RuleDraft, RuleId, RuleOption, Scope, ScopeKey, ScopeOption,
    Selection, TextRange,
};
use hl_matcher::{LanguageWords, SeparatorSet, WordPatternCache, WordPolicy, find_matches};
use hl_scanner::{
    DiskSource, FileSource, FinishOutcome, RequestOutcome, ScanError, ScanReport, ScanRequest,
    ScanTracker, ScopeScanner, StatsSnapshot, WordResolver,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{Notify, broadcast};
use tracing::{debug, error, info, warn};

use crate::decoration::Decoration;
use crate::error::EngineError;
use crate::host::Host;
use crate::navigation::{Direction, NavigationIndex, NavigationOrigin, NavigationTarget, selection_match_index};
use crate::resolver::ScopeResolver;
use crate::snapshot::RuleSnapshot;
use crate::store::{Rule, RuleStore};

/// Change notifications, sent after every state mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A rule was created.
    RuleCreated(RuleId),
    /// A rule's fields or matches changed.
    RuleUpdated(RuleId),
    /// A rule was deleted.
    RuleDeleted(RuleId),
    /// Matches in a document were recomputed.
    DocumentUpdated(Location),
    /// A folder scan was applied.
    ScanCompleted {
        /// The scanned rule.
        rule: RuleId,
        /// Scan counters.
        stats: StatsSnapshot,
    },
    /// A folder scan could not enumerate its scope.
    ScanFailed {
        /// The scanned rule.
        rule: RuleId,
        /// What went wrong.
        error: String,
    },
}

struct State {
    store: RuleStore,
    index: NavigationIndex,
    scans: ScanTracker,
    separators: SeparatorSet,
}

struct Inner {
    host: Arc<dyn Host>,
    scanner: ScopeScanner,
    config: EngineConfig,
    resolver: ScopeResolver,
    words: Arc<Mutex<WordPatternCache>>,
    state: Mutex<State>,
    events: broadcast::Sender<EngineEvent>,
    idle: Notify,
    runtime: Handle,
}

/// The scoped highlight rule engine.
///
/// `Engine` is cheaply cloneable; clones share state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use hl_core::{Config, Location, RuleDraft};
/// use hl_engine::{Engine, MemoryHost};
/// use hl_scanner::MemorySource;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), hl_engine::EngineError> {
/// let host = Arc::new(MemoryHost::new());
/// let doc = Location::parse("file:///w/notes.txt").unwrap();
/// host.open(&doc, "todo: one, todo: two");
///
/// let engine = Engine::new(host, Arc::new(MemorySource::new()), &Config::default())?;
/// let id = engine.create_rule(&doc, RuleDraft::new("todo", "#ffcc00"), None)?;
///
/// let snapshot = engine.snapshot(id, Some(&doc))?;
/// assert_eq!(snapshot.local_count, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Engine")
            .field("rules", &state.store.len())
            .field("running_scans", &state.scans.running())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine reading folder scopes from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRuntime`] outside a tokio runtime.
    pub fn new(
        host: Arc<dyn Host>,
        source: Arc<dyn FileSource>,
        config: &Config,
    ) -> Result<Self, EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let (events, _) = broadcast::channel(config.engine.event_capacity);
        let inner = Inner {
            host,
            scanner: ScopeScanner::new(source, config.scan.max_files),
            config: config.engine.clone(),
            resolver: ScopeResolver::new(config.scan.max_hierarchy_depth),
            words: Arc::new(Mutex::new(WordPatternCache::new())),
            state: Mutex::new(State {
                store: RuleStore::new(),
                index: NavigationIndex::new(),
                scans: ScanTracker::new(),
                separators: SeparatorSet::new(&config.words.separators),
            }),
            events,
            idle: Notify::new(),
            runtime,
        };
        debug!(max_files = config.scan.max_files, "Engine created");
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Creates an engine scanning folder scopes on the local file system.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoRuntime`] outside a tokio runtime.
    pub fn with_disk(host: Arc<dyn Host>, config: &Config) -> Result<Self, EngineError> {
        Self::new(host, Arc::new(DiskSource::new(config.scan.clone())), config)
    }

    /// Subscribes to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }

    /// Resolves once no scan is running or queued.
    pub async fn wait_for_scans(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            let idle = self.inner.state.lock().scans.is_idle();
            if idle {
                return;
            }
            notified.await;
        }
    }

    /// Scope choices for a new rule on `document`.
    #[must_use]
    pub fn scope_options(&self, document: &Location) -> Vec<ScopeOption> {
        self.inner.resolver.scope_options(document)
    }

    // =========================================================================
    // Rule operations
    // =========================================================================

    /// Creates a rule anchored at `document`.
    ///
    /// `preferred` picks the scope; `None` uses the configured default. A
    /// folder scope on a document without a containing folder falls back to
    /// document scope.
    ///
    /// # Errors
    ///
    /// Fails validation for an empty pattern or color, an uncompilable
    /// pattern, or an invalid file filter. Nothing is created on failure.
    pub fn create_rule(
        &self,
        document: &Location,
        draft: RuleDraft,
        preferred: Option<Scope>,
    ) -> Result<RuleId, EngineError> {
        let scope = preferred.unwrap_or(self.inner.config.default_scope);
        let key = self.inner.resolver.resolve(document, Some(scope));
        self.create_rule_in(key, draft)
    }

    /// Creates a rule under an explicit scope key.
    ///
    /// # Errors
    ///
    /// As [`Engine::create_rule`].
    pub fn create_rule_in(&self, key: ScopeKey, draft: RuleDraft) -> Result<RuleId, EngineError> {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        let host = &inner.host;
        let id = state
            .store
            .create(draft, key, &inner.config.filter_separators, |style| {
                Decoration::new(host.create_decoration(style), style.clone())
            })?;
        inner.refresh_rule(&mut state, id);
        drop(state);

        info!(rule = %id, "Highlight rule created");
        inner.emit(EngineEvent::RuleCreated(id));
        Ok(id)
    }

    /// Replaces a rule's pattern.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id, an empty pattern, or one that does not
    /// compile. The rule is unchanged on failure.
    pub fn set_pattern(&self, id: RuleId, pattern: &str) -> Result<bool, EngineError> {
        self.inner
            .mutate(id, |state| state.store.set_pattern(id, pattern))
    }

    /// Replaces a rule's color and decoration.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id or an empty color.
    pub fn set_color(&self, id: RuleId, color: &str) -> Result<bool, EngineError> {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        let host = &inner.host;
        let Some(old) = state.store.set_color(id, color, |style| {
            Decoration::new(host.create_decoration(style), style.clone())
        })?
        else {
            return Ok(false);
        };
        host.dispose_decoration(old.into_id());
        inner.repaint_rule(&mut state, id);
        drop(state);

        inner.emit(EngineEvent::RuleUpdated(id));
        Ok(true)
    }

    /// Sets one matching switch.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id, or when the pattern does not compile under
    /// the new option; the option then keeps its value.
    pub fn set_option(&self, id: RuleId, option: RuleOption, value: bool) -> Result<bool, EngineError> {
        self.inner
            .mutate(id, |state| state.store.set_option(id, option, value))
    }

    /// Flips one matching switch and returns its new value.
    ///
    /// # Errors
    ///
    /// As [`Engine::set_option`].
    pub fn toggle_option(&self, id: RuleId, option: RuleOption) -> Result<bool, EngineError> {
        let current = self
            .inner
            .state
            .lock()
            .store
            .get(id)
            .map(|rule| rule.options().get(option))
            .ok_or(EngineError::RuleNotFound(id))?;
        self.set_option(id, option, !current)?;
        Ok(!current)
    }

    /// Replaces a rule's file filter. `None` or blank input clears it.
    ///
    /// # Errors
    ///
    /// Fails for an unknown id or a filter with an invalid glob.
    pub fn set_filter(&self, id: RuleId, filter: Option<&str>) -> Result<bool, EngineError> {
        let separators = self.inner.config.filter_separators.as_str();
        self.inner
            .mutate(id, |state| state.store.set_filter(id, filter, separators))
    }

    /// Moves a rule to `scope`, anchored at `document`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuleNotFound`] for an unknown id.
    pub fn change_scope(&self, id: RuleId, scope: Scope, document: &Location) -> Result<bool, EngineError> {
        let key = self.inner.resolver.resolve(document, Some(scope));
        self.change_scope_to(id, key)
    }

    /// Moves a rule to an explicit scope key.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuleNotFound`] for an unknown id.
    pub fn change_scope_to(&self, id: RuleId, key: ScopeKey) -> Result<bool, EngineError> {
        self.inner
            .mutate(id, |state| state.store.change_scope(id, key))
    }

    /// Deletes a rule, disposing its decoration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuleNotFound`] for an unknown id.
    pub fn delete_rule(&self, id: RuleId) -> Result<(), EngineError> {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        let rule = state.store.remove(id).ok_or(EngineError::RuleNotFound(id))?;
        inner.host.dispose_decoration(rule.into_decoration().into_id());
        state.index.clear_rule(id);
        state.scans.cancel_pending(id);
        drop(state);

        info!(rule = %id, "Highlight rule deleted");
        inner.emit(EngineEvent::RuleDeleted(id));
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshots of every rule in creation order, with local counts for
    /// `document`.
    #[must_use]
    pub fn list_rules(&self, document: Option<&Location>) -> Vec<RuleSnapshot> {
        let state = self.inner.state.lock();
        state
            .store
            .ids()
            .into_iter()
            .filter_map(|id| state.store.get(id))
            .map(|rule| RuleSnapshot::capture(rule, &state.index, document))
            .collect()
    }

    /// Snapshot of one rule.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuleNotFound`] for an unknown id.
    pub fn snapshot(&self, id: RuleId, document: Option<&Location>) -> Result<RuleSnapshot, EngineError> {
        let state = self.inner.state.lock();
        let rule = state.store.get(id).ok_or(EngineError::RuleNotFound(id))?;
        Ok(RuleSnapshot::capture(rule, &state.index, document))
    }

    /// Snapshots of the rules highlighting `document`.
    #[must_use]
    pub fn rules_for_document(&self, document: &Location) -> Vec<RuleSnapshot> {
        let state = self.inner.state.lock();
        state
            .store
            .rules_for(document, &self.inner.resolver)
            .into_iter()
            .filter_map(|id| state.store.get(id))
            .map(|rule| RuleSnapshot::capture(rule, &state.index, Some(document)))
            .collect()
    }

    /// Every match of a rule in global order.
    #[must_use]
    pub fn global_order(&self, id: RuleId) -> Vec<(Location, TextRange)> {
        self.inner.state.lock().index.global_order(id)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Moves to the next or previous match of a rule, opening its document
    /// and selecting the range.
    ///
    /// `document` is the document the request came from, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoMatches`] when the rule has no matches and
    /// [`EngineError::DocumentUnavailable`] when the host cannot open the
    /// target.
    pub fn navigate(
        &self,
        id: RuleId,
        direction: Direction,
        document: Option<&Location>,
    ) -> Result<NavigationTarget, EngineError> {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        if !state.store.contains(id) {
            return Err(EngineError::RuleNotFound(id));
        }

        let active = inner.host.active_document();
        let active_local = active.as_ref().and_then(|doc| {
            let stats = state.index.stats(id, doc)?;
            let selection = inner.host.selections(doc).first().copied()?;
            selection_match_index(selection, stats.ranges())
        });
        let origin = NavigationOrigin {
            active: active.as_ref().map(|doc| (doc, active_local)),
            document,
        };
        let target = state
            .index
            .peek(id, direction, &origin)
            .ok_or(EngineError::NoMatches(id))?;

        if !inner.host.open_document(&target.document) {
            warn!(rule = %id, document = %target.document, "Navigation target unavailable");
            return Err(EngineError::DocumentUnavailable(target.document));
        }
        state.index.commit(id, &target);
        inner
            .host
            .reveal_selection(&target.document, Selection::from_range(target.range));
        inner.paint_document(&mut state, &target.document);
        drop(state);

        debug!(
            rule = %id,
            document = %target.document,
            index = target.global_index,
            total = target.total,
            "Navigated"
        );
        inner.emit(EngineEvent::RuleUpdated(id));
        Ok(target)
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// A document's text changed.
    pub fn document_changed(&self, document: &Location) {
        let mut state = self.inner.state.lock();
        self.inner.refresh_document(&mut state, document);
        drop(state);
        self.inner.emit(EngineEvent::DocumentUpdated(document.clone()));
    }

    /// The selection in a document's editor changed.
    pub fn selection_changed(&self, document: &Location) {
        let mut state = self.inner.state.lock();
        let changed = self.inner.sync_selection(&mut state, document);
        drop(state);
        if changed {
            self.inner.emit(EngineEvent::DocumentUpdated(document.clone()));
        }
    }

    /// The active editor changed.
    pub fn active_editor_changed(&self, document: Option<&Location>) {
        let Some(document) = document else {
            return;
        };
        let mut state = self.inner.state.lock();
        self.inner.refresh_document(&mut state, document);
        self.inner.sync_selection(&mut state, document);
        drop(state);
        self.inner.emit(EngineEvent::DocumentUpdated(document.clone()));
    }

    /// A document was closed.
    ///
    /// Its match statistics are dropped for every rule. Folder rules covering
    /// it are rescanned so the on-disk content replaces unsaved text.
    pub fn document_closed(&self, document: &Location) {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        state.index.clear_document_all(document);
        let folder_rules = inner.folder_rules_covering(&state, document);
        for id in folder_rules {
            inner.schedule_scan(&mut state, id);
        }
        drop(state);
        inner.emit(EngineEvent::DocumentUpdated(document.clone()));
    }

    /// A file changed on disk. Returns how many rules were scheduled for a
    /// rescan.
    pub fn file_changed_on_disk(&self, location: &Location) -> usize {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        let folder_rules = inner.folder_rules_covering(&state, location);
        for id in &folder_rules {
            inner.schedule_scan(&mut state, *id);
        }
        debug!(location = %location, rules = folder_rules.len(), "File changed on disk");
        folder_rules.len()
    }
}

impl Inner {
    fn emit(&self, event: EngineEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    /// Runs a store mutation and, when it changed matching, repaints and
    /// rescans the rule.
    fn mutate(
        self: &Arc<Self>,
        id: RuleId,
        op: impl FnOnce(&mut State) -> Result<bool, EngineError>,
    ) -> Result<bool, EngineError> {
        let mut state = self.state.lock();
        if !op(&mut state)? {
            return Ok(false);
        }
        self.clear_rule(&mut state, id);
        self.refresh_rule(&mut state, id);
        drop(state);

        self.emit(EngineEvent::RuleUpdated(id));
        Ok(true)
    }

    /// Removes a rule's decorations and statistics from every document.
    fn clear_rule(&self, state: &mut State, id: RuleId) {
        let Some(rule) = state.store.get(id) else {
            return;
        };
        let decoration = rule.decoration().id();
        let mut documents = state.index.documents(id);
        documents.extend(self.host.visible_documents());
        documents.sort_unstable();
        documents.dedup();
        for document in &documents {
            self.host.apply_decorations(document, decoration, &[]);
        }
        state.index.clear_rule(id);
    }

    /// Matches a rule against visible documents and schedules a scan for
    /// folder scopes.
    fn refresh_rule(self: &Arc<Self>, state: &mut State, id: RuleId) {
        let Some(rule) = state.store.get(id) else {
            return;
        };
        let mut documents = self.host.visible_documents();
        if rule.key().scope == Scope::Document {
            documents.push(rule.key().target.clone());
        }
        documents.sort_unstable();
        documents.dedup();
        for document in &documents {
            self.apply_rule(state, id, document);
        }
        self.schedule_scan(state, id);
    }

    /// Re-applies a rule's visible matches, as after a color change.
    fn repaint_rule(&self, state: &mut State, id: RuleId) {
        for document in self.host.visible_documents() {
            self.apply_rule(state, id, &document);
        }
    }

    /// Matches every applicable rule against a document's live text.
    fn refresh_document(&self, state: &mut State, document: &Location) {
        for id in state.store.rules_for(document, &self.resolver) {
            self.apply_rule(state, id, document);
        }
    }

    /// Paints a document from live text when it is open.
    fn paint_document(&self, state: &mut State, document: &Location) {
        for id in state.store.rules_for(document, &self.resolver) {
            let Some(rule) = state.store.get(id) else {
                continue;
            };
            let ranges = state
                .index
                .stats(id, document)
                .map(|s| s.ranges().to_vec())
                .unwrap_or_default();
            self.host
                .apply_decorations(document, rule.decoration().id(), &ranges);
        }
    }

    /// Matches one rule against one document's live text.
    fn apply_rule(&self, state: &mut State, id: RuleId, document: &Location) {
        let State {
            store,
            index,
            separators,
            ..
        } = state;
        let Some(rule) = store.get(id) else {
            return;
        };
        if !rule.applies_to(document) {
            return;
        }
        let Some(text) = self.host.document_text(document) else {
            return;
        };

        let language = if rule.options().whole_word {
            self.language_words(document)
        } else {
            None
        };
        let policy = match &language {
            Some(language) => WordPolicy::Language(language),
            None => WordPolicy::Separators(separators),
        };

        let ranges = find_matches(&text, rule.matcher(), &policy);
        self.host
            .apply_decorations(document, rule.decoration().id(), &ranges);
        index.set_document(id, document, ranges);
    }

    fn language_words(&self, document: &Location) -> Option<Arc<LanguageWords>> {
        let language = self
            .host
            .language_id(document)
            .or_else(|| self.host.file_language(document))?;
        resolve_words(self.host.as_ref(), &self.words, &language)
    }

    /// Points each rule's current match at the primary selection.
    ///
    /// A selection off every match keeps the previous index.
    fn sync_selection(&self, state: &mut State, document: &Location) -> bool {
        let Some(selection) = self.host.selections(document).first().copied() else {
            return false;
        };
        let mut changed = false;
        for id in state.store.rules_for(document, &self.resolver) {
            let local = state
                .index
                .stats(id, document)
                .and_then(|stats| selection_match_index(selection, stats.ranges()));
            if local.is_some() {
                state.index.set_current(id, document, local);
                changed = true;
            }
        }
        changed
    }

    fn folder_rules_covering(&self, state: &State, location: &Location) -> Vec<RuleId> {
        state
            .store
            .rules_for(location, &self.resolver)
            .into_iter()
            .filter(|id| {
                state
                    .store
                    .get(*id)
                    .is_some_and(|rule| rule.key().scope.is_folder())
            })
            .collect()
    }

    // =========================================================================
    // Scans
    // =========================================================================

    fn schedule_scan(self: &Arc<Self>, state: &mut State, id: RuleId) {
        let Some(rule) = state.store.get(id) else {
            return;
        };
        if !rule.key().scope.is_folder() {
            return;
        }
        let request = self.scan_request(rule, &state.separators);
        match state.scans.request(id) {
            RequestOutcome::Start => self.spawn_scan(request),
            RequestOutcome::Coalesced => debug!(rule = %id, "Scan coalesced"),
        }
    }

    fn spawn_scan(self: &Arc<Self>, request: ScanRequest) {
        let inner = Arc::clone(self);
        let rule = request.rule;
        debug!(rule = %rule, scope = %request.key, revision = request.revision, "Scan started");
        self.runtime.spawn(async move {
            let scanner = inner.scanner.clone();
            let result = tokio::task::spawn_blocking(move || scanner.perform_scan(&request)).await;
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(rule = %rule, error = %e, "Scan task failed");
                    Err(ScanError::WorkerFailed(e.to_string()))
                }
            };
            inner.complete_scan(rule, outcome);
        });
    }

    fn complete_scan(self: &Arc<Self>, rule: RuleId, outcome: Result<ScanReport, ScanError>) {
        let mut state = self.state.lock();
        let event = match outcome {
            Ok(report) => self.apply_report(&mut state, report),
            Err(e) => {
                warn!(rule = %rule, error = %e, "Scan failed");
                Some(EngineEvent::ScanFailed {
                    rule,
                    error: e.to_string(),
                })
            }
        };

        loop {
            match state.scans.finish(rule) {
                FinishOutcome::Idle => break,
                FinishOutcome::Rescan => {
                    let request = state
                        .store
                        .get(rule)
                        .filter(|r| r.key().scope.is_folder())
                        .map(|r| self.scan_request(r, &state.separators));
                    if let Some(request) = request {
                        self.spawn_scan(request);
                        break;
                    }
                }
            }
        }
        let idle = state.scans.is_idle();
        drop(state);

        if let Some(event) = event {
            self.emit(event);
        }
        if idle {
            self.idle.notify_waiters();
        }
    }

    /// Installs a scan's results unless the rule changed since it started.
    fn apply_report(&self, state: &mut State, report: ScanReport) -> Option<EngineEvent> {
        let id = report.rule;
        let current = state.store.get(id).map(Rule::revision);
        if current != Some(report.revision) {
            debug!(
                rule = %id,
                scanned = report.revision,
                current = ?current,
                "Discarding stale scan"
            );
            return None;
        }

        state.index.replace_all(
            id,
            report.files.into_iter().map(|f| (f.location, f.ranges)),
        );
        for document in self.host.visible_documents() {
            self.apply_rule(state, id, &document);
        }
        if let Some(active) = self.host.active_document() {
            self.sync_selection(state, &active);
        }
        state.index.clear_global_index(id);

        info!(
            rule = %id,
            files = report.stats.files_matched,
            matches = report.stats.matches,
            failed = report.stats.files_failed,
            "Scan applied"
        );
        Some(EngineEvent::ScanCompleted {
            rule: id,
            stats: report.stats,
        })
    }

    fn scan_request(&self, rule: &Rule, separators: &SeparatorSet) -> ScanRequest {
        let words = rule.options().whole_word.then(|| {
            Arc::new(HostWords {
                host: Arc::clone(&self.host),
                cache: Arc::clone(&self.words),
            }) as Arc<dyn WordResolver>
        });
        ScanRequest {
            rule: rule.id(),
            revision: rule.revision(),
            key: rule.key().clone(),
            matcher: rule.matcher().clone(),
            filter: rule.filter().cloned(),
            separators: separators.clone(),
            words,
        }
    }
}

/// Word patterns for files read by a scan, looked up by file name.
struct HostWords {
    host: Arc<dyn Host>,
    cache: Arc<Mutex<WordPatternCache>>,
}

impl std::fmt::Debug for HostWords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostWords").finish_non_exhaustive()
    }
}

impl WordResolver for HostWords {
    fn words_for(&self, file: &Location) -> Option<Arc<LanguageWords>> {
        let language = self.host.file_language(file)?;
        resolve_words(self.host.as_ref(), &self.cache, &language)
    }
}

/// Locks only the cache, never engine state.
fn resolve_words(
    host: &dyn Host,
    cache: &Mutex<WordPatternCache>,
    language: &str,
) -> Option<Arc<LanguageWords>> {
    let source = host.word_pattern(language)?;
    cache.lock().resolve(language, &source)
}
