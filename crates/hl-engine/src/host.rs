//! The editing environment the engine runs inside.

use hl_core::{Location, Selection, TextRange};
use hl_matcher::WordPatternSource;

use crate::decoration::{DecorationId, DecorationStyle};

/// Capabilities the engine needs from its host editor.
///
/// Calls are made while the engine holds its state lock, so implementations
/// must not call back into the engine. [`Host::file_language`] and
/// [`Host::word_pattern`] are also called from scan workers.
pub trait Host: Send + Sync + 'static {
    /// Full text of an open document.
    fn document_text(&self, document: &Location) -> Option<String>;

    /// Language identifier of an open document.
    fn language_id(&self, _document: &Location) -> Option<String> {
        None
    }

    /// Language a file would open with, judged from its name. Used for
    /// files read from disk by folder scans.
    fn file_language(&self, _file: &Location) -> Option<String> {
        None
    }

    /// The document with keyboard focus.
    fn active_document(&self) -> Option<Location>;

    /// Documents shown in an editor.
    fn visible_documents(&self) -> Vec<Location>;

    /// Selections in a document's editor, primary first.
    fn selections(&self, document: &Location) -> Vec<Selection>;

    /// Opens and activates a document. Returns `false` if it cannot be
    /// opened.
    fn open_document(&self, document: &Location) -> bool;

    /// Sets the primary selection and scrolls it into view.
    fn reveal_selection(&self, document: &Location, selection: Selection);

    /// Creates a decoration with `style`.
    fn create_decoration(&self, style: &DecorationStyle) -> DecorationId;

    /// Marks `ranges` with a decoration in every editor showing `document`.
    /// An empty slice clears it.
    fn apply_decorations(&self, document: &Location, decoration: DecorationId, ranges: &[TextRange]);

    /// Releases a decoration everywhere.
    fn dispose_decoration(&self, decoration: DecorationId);

    /// The language's word pattern, if one is configured.
    fn word_pattern(&self, _language_id: &str) -> Option<WordPatternSource> {
        None
    }
}
