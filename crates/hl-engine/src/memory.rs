//! An in-memory [`Host`].
//!
//! Used by tests, by embedders without an editor, and by the CLI. Documents
//! can be opened explicitly or loaded on demand from a [`FileSource`].

use std::collections::BTreeMap;
use std::sync::Arc;

use hl_core::{FxHashMap, Location, Selection, TextRange};
use hl_matcher::WordPatternSource;
use hl_scanner::FileSource;
use parking_lot::Mutex;
use tracing::debug;

use crate::decoration::{DecorationId, DecorationStyle};
use crate::host::Host;

#[derive(Debug, Clone)]
struct MemoryDocument {
    text: String,
    language_id: Option<String>,
    selections: Vec<Selection>,
}

#[derive(Debug, Default)]
struct HostState {
    documents: BTreeMap<Location, MemoryDocument>,
    visible: Vec<Location>,
    active: Option<Location>,
    decorations: FxHashMap<DecorationId, DecorationStyle>,
    applied: FxHashMap<(Location, DecorationId), Vec<TextRange>>,
    disposed: Vec<DecorationId>,
    next_decoration: u64,
    word_patterns: FxHashMap<String, WordPatternSource>,
    extensions: FxHashMap<String, String>,
}

/// A host whose editors and decorations live in memory.
///
/// # Examples
///
/// ```
/// use hl_core::{Location, Selection};
/// use hl_engine::{Host, MemoryHost};
///
/// let host = MemoryHost::new();
/// let doc = Location::parse("file:///w/a.txt").unwrap();
/// host.open(&doc, "hello");
/// host.set_selection(&doc, Selection::caret(2));
///
/// assert_eq!(host.active_document(), Some(doc.clone()));
/// assert_eq!(host.selections(&doc), vec![Selection::caret(2)]);
/// ```
#[derive(Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
    loader: Option<Arc<dyn FileSource>>,
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryHost")
            .field("documents", &state.documents.len())
            .field("active", &state.active)
            .field("decorations", &state.decorations.len())
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    /// Creates a host with no documents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads documents that are not open from `loader` when navigation
    /// needs them.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn FileSource>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Opens `document` in a visible, active editor.
    pub fn open(&self, document: &Location, text: impl Into<String>) {
        let mut state = self.state.lock();
        state.documents.insert(
            document.clone(),
            MemoryDocument {
                text: text.into(),
                language_id: None,
                selections: vec![Selection::caret(0)],
            },
        );
        if !state.visible.contains(document) {
            state.visible.push(document.clone());
        }
        state.active = Some(document.clone());
    }

    /// Opens `document` without showing it.
    pub fn open_hidden(&self, document: &Location, text: impl Into<String>) {
        self.state.lock().documents.insert(
            document.clone(),
            MemoryDocument {
                text: text.into(),
                language_id: None,
                selections: vec![Selection::caret(0)],
            },
        );
    }

    /// Replaces an open document's text. Returns `false` if it is not open.
    pub fn set_text(&self, document: &Location, text: impl Into<String>) -> bool {
        match self.state.lock().documents.get_mut(document) {
            Some(doc) => {
                doc.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Sets an open document's language.
    pub fn set_language(&self, document: &Location, language_id: impl Into<String>) {
        if let Some(doc) = self.state.lock().documents.get_mut(document) {
            doc.language_id = Some(language_id.into());
        }
    }

    /// Configures a language's word pattern.
    pub fn set_word_pattern(&self, language_id: impl Into<String>, source: WordPatternSource) {
        self.state
            .lock()
            .word_patterns
            .insert(language_id.into(), source);
    }

    /// Associates a file extension (without the dot) with a language.
    pub fn set_extension_language(&self, extension: impl Into<String>, language_id: impl Into<String>) {
        self.state
            .lock()
            .extensions
            .insert(extension.into(), language_id.into());
    }

    /// Makes `document` the active editor. It becomes visible.
    pub fn set_active(&self, document: Option<&Location>) {
        let mut state = self.state.lock();
        if let Some(document) = document {
            if !state.visible.contains(document) {
                state.visible.push(document.clone());
            }
        }
        state.active = document.cloned();
    }

    /// Replaces the selections of an open document.
    pub fn set_selection(&self, document: &Location, selection: Selection) {
        if let Some(doc) = self.state.lock().documents.get_mut(document) {
            doc.selections = vec![selection];
        }
    }

    /// Closes a document and its editor.
    pub fn close(&self, document: &Location) {
        let mut state = self.state.lock();
        state.documents.remove(document);
        state.visible.retain(|d| d != document);
        if state.active.as_ref() == Some(document) {
            state.active = state.visible.last().cloned();
        }
        state.applied.retain(|(d, _), _| d != document);
    }

    /// Ranges currently painted with `decoration` in `document`.
    #[must_use]
    pub fn applied(&self, document: &Location, decoration: DecorationId) -> Vec<TextRange> {
        self.state
            .lock()
            .applied
            .get(&(document.clone(), decoration))
            .cloned()
            .unwrap_or_default()
    }

    /// Style of a live decoration.
    #[must_use]
    pub fn decoration_style(&self, decoration: DecorationId) -> Option<DecorationStyle> {
        self.state.lock().decorations.get(&decoration).cloned()
    }

    /// Number of decorations created and not yet disposed.
    #[must_use]
    pub fn live_decorations(&self) -> usize {
        self.state.lock().decorations.len()
    }

    /// Every disposal in order, including repeated ones.
    #[must_use]
    pub fn disposed(&self) -> Vec<DecorationId> {
        self.state.lock().disposed.clone()
    }
}

impl Host for MemoryHost {
    fn document_text(&self, document: &Location) -> Option<String> {
        self.state
            .lock()
            .documents
            .get(document)
            .map(|d| d.text.clone())
    }

    fn language_id(&self, document: &Location) -> Option<String> {
        let explicit = self
            .state
            .lock()
            .documents
            .get(document)
            .and_then(|d| d.language_id.clone());
        explicit.or_else(|| self.file_language(document))
    }

    fn file_language(&self, file: &Location) -> Option<String> {
        let (_, extension) = file.file_name()?.rsplit_once('.')?;
        self.state.lock().extensions.get(extension).cloned()
    }

    fn active_document(&self) -> Option<Location> {
        self.state.lock().active.clone()
    }

    fn visible_documents(&self) -> Vec<Location> {
        self.state.lock().visible.clone()
    }

    fn selections(&self, document: &Location) -> Vec<Selection> {
        self.state
            .lock()
            .documents
            .get(document)
            .map(|d| d.selections.clone())
            .unwrap_or_default()
    }

    fn open_document(&self, document: &Location) -> bool {
        if self.state.lock().documents.contains_key(document) {
            self.set_active(Some(document));
            return true;
        }
        let Some(loader) = &self.loader else {
            return false;
        };
        match loader.read(document) {
            Ok(text) => {
                debug!(document = %document, "Loaded document");
                self.open(document, text);
                true
            }
            Err(e) => {
                debug!(document = %document, error = %e, "Cannot open document");
                false
            }
        }
    }

    fn reveal_selection(&self, document: &Location, selection: Selection) {
        self.set_selection(document, selection);
    }

    fn create_decoration(&self, style: &DecorationStyle) -> DecorationId {
        let mut state = self.state.lock();
        state.next_decoration += 1;
        let id = DecorationId(state.next_decoration);
        state.decorations.insert(id, style.clone());
        id
    }

    fn apply_decorations(&self, document: &Location, decoration: DecorationId, ranges: &[TextRange]) {
        let mut state = self.state.lock();
        if ranges.is_empty() {
            state.applied.remove(&(document.clone(), decoration));
        } else {
            state
                .applied
                .insert((document.clone(), decoration), ranges.to_vec());
        }
    }

    fn dispose_decoration(&self, decoration: DecorationId) {
        let mut state = self.state.lock();
        state.decorations.remove(&decoration);
        state.applied.retain(|(_, id), _| *id != decoration);
        state.disposed.push(decoration);
    }

    fn word_pattern(&self, language_id: &str) -> Option<WordPatternSource> {
        self.state.lock().word_patterns.get(language_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_scanner::MemorySource;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn test_open_makes_active_and_visible() {
        let host = MemoryHost::new();
        let a = loc("file:///a");
        let b = loc("file:///b");
        host.open(&a, "x");
        host.open_hidden(&b, "y");
        assert_eq!(host.visible_documents(), vec![a.clone()]);
        assert_eq!(host.active_document(), Some(a.clone()));
        assert_eq!(host.document_text(&b).as_deref(), Some("y"));
        host.close(&a);
        assert_eq!(host.active_document(), None);
    }

    #[test]
    fn test_open_document_uses_loader() {
        let source = Arc::new(MemorySource::new());
        let doc = loc("mem:/w/a");
        source.insert(doc.clone(), "from disk");
        let host = MemoryHost::new().with_loader(source);
        assert!(host.open_document(&doc));
        assert_eq!(host.document_text(&doc).as_deref(), Some("from disk"));
        assert_eq!(host.active_document(), Some(doc));
        assert!(!host.open_document(&loc("mem:/w/missing")));
    }

    #[test]
    fn test_extension_language() {
        let host = MemoryHost::new();
        let doc = loc("file:///w/core.lisp");
        host.set_extension_language("lisp", "lisp");
        assert_eq!(host.file_language(&doc).as_deref(), Some("lisp"));
        assert_eq!(host.file_language(&loc("file:///w/README")), None);

        host.open(&doc, "");
        assert_eq!(host.language_id(&doc).as_deref(), Some("lisp"));
        host.set_language(&doc, "scheme");
        assert_eq!(host.language_id(&doc).as_deref(), Some("scheme"));
    }

    #[test]
    fn test_decoration_lifecycle() {
        let host = MemoryHost::new();
        let doc = loc("file:///a");
        let id = host.create_decoration(&DecorationStyle::from_color("#fff"));
        host.apply_decorations(&doc, id, &[TextRange::new(0, 1)]);
        assert_eq!(host.applied(&doc, id), vec![TextRange::new(0, 1)]);
        host.apply_decorations(&doc, id, &[]);
        assert!(host.applied(&doc, id).is_empty());
        host.dispose_decoration(id);
        assert_eq!(host.live_decorations(), 0);
        assert_eq!(host.disposed(), vec![id]);
    }
}
