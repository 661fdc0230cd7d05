//! Mapping documents to scope identities.

use hl_core::{Location, Scope, ScopeKey, ScopeOption};
use smallvec::SmallVec;
use tracing::debug;

/// Default bound on how many ancestor folders are considered.
pub const MAX_HIERARCHY_DEPTH: usize = 50;

/// Resolves the scope identities a document can belong to.
///
/// # Examples
///
/// ```
/// use hl_core::{Location, Scope};
/// use hl_engine::ScopeResolver;
///
/// let resolver = ScopeResolver::default();
/// let doc = Location::parse("file:///w/src/lib.rs").unwrap();
///
/// let key = resolver.resolve(&doc, Some(Scope::Folder));
/// assert_eq!(key.target.as_str(), "file:///w/src");
///
/// // No containing folder: falls back to document scope.
/// let untitled = Location::parse("untitled:Untitled-1").unwrap();
/// assert_eq!(resolver.resolve(&untitled, Some(Scope::Folder)).scope, Scope::Document);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScopeResolver {
    max_depth: usize,
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new(MAX_HIERARCHY_DEPTH)
    }
}

impl ScopeResolver {
    /// Creates a resolver walking at most `max_depth` ancestors.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Resolves the key a new rule on `document` gets.
    ///
    /// `None` selects document scope. A folder scope requested for a
    /// location without a containing folder falls back to document scope.
    #[must_use]
    pub fn resolve(&self, document: &Location, preferred: Option<Scope>) -> ScopeKey {
        match preferred.unwrap_or_default() {
            Scope::Document => ScopeKey::document(document.clone()),
            scope => match document.parent() {
                Some(folder) => ScopeKey::new(scope, folder),
                None => {
                    debug!(
                        document = %document,
                        scope = %scope,
                        "No containing folder, using document scope"
                    );
                    ScopeKey::document(document.clone())
                }
            },
        }
    }

    /// Scope choices for `document`: document, then folder and folder
    /// recursive when a containing folder exists.
    #[must_use]
    pub fn scope_options(&self, document: &Location) -> Vec<ScopeOption> {
        let mut options = vec![ScopeOption {
            scope: Scope::Document,
            target: document.clone(),
            label: label(Scope::Document, document),
        }];
        if let Some(folder) = document.parent() {
            for scope in [Scope::Folder, Scope::FolderRecursive] {
                options.push(ScopeOption {
                    scope,
                    target: folder.clone(),
                    label: label(scope, &folder),
                });
            }
        }
        options
    }

    /// Ancestor folders of `document`, innermost first.
    #[must_use]
    pub fn folder_hierarchy(&self, document: &Location) -> Vec<Location> {
        let mut folders = Vec::new();
        let mut current = document.parent();
        while let Some(folder) = current {
            if folders.len() >= self.max_depth {
                debug!(document = %document, depth = self.max_depth, "Folder hierarchy truncated");
                break;
            }
            current = folder.parent();
            folders.push(folder);
        }
        folders
    }

    /// Every key a rule covering `document` could be stored under.
    ///
    /// The document's own key, its immediate folder, and a recursive key for
    /// each ancestor.
    #[must_use]
    pub fn candidate_keys(&self, document: &Location) -> SmallVec<[ScopeKey; 8]> {
        let mut keys = SmallVec::new();
        keys.push(ScopeKey::document(document.clone()));
        let hierarchy = self.folder_hierarchy(document);
        if let Some(parent) = hierarchy.first() {
            keys.push(ScopeKey::new(Scope::Folder, parent.clone()));
        }
        keys.extend(
            hierarchy
                .into_iter()
                .map(|folder| ScopeKey::new(Scope::FolderRecursive, folder)),
        );
        keys
    }
}

fn label(scope: Scope, target: &Location) -> String {
    let name = target.file_name().unwrap_or_else(|| target.as_str());
    format!("{}: {name}", scope.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn test_resolve_default_is_document() {
        let doc = loc("file:///w/a.rs");
        assert_eq!(ScopeResolver::default().resolve(&doc, None), ScopeKey::document(doc));
    }

    #[test]
    fn test_resolve_folder_scopes_use_immediate_folder() {
        let resolver = ScopeResolver::default();
        let doc = loc("file:///w/src/a.rs");
        let folder = resolver.resolve(&doc, Some(Scope::Folder));
        let recursive = resolver.resolve(&doc, Some(Scope::FolderRecursive));
        assert_eq!(folder, ScopeKey::folder(loc("file:///w/src"), false));
        assert_eq!(recursive, ScopeKey::folder(loc("file:///w/src"), true));
    }

    #[test]
    fn test_resolve_falls_back_without_folder() {
        let doc = loc("untitled:Untitled-1");
        let key = ScopeResolver::default().resolve(&doc, Some(Scope::FolderRecursive));
        assert_eq!(key, ScopeKey::document(doc));
    }

    #[test]
    fn test_scope_options_order_and_labels() {
        let options = ScopeResolver::default().scope_options(&loc("file:///w/src/a.rs"));
        let scopes: Vec<Scope> = options.iter().map(|o| o.scope).collect();
        assert_eq!(scopes, Scope::ALL);
        assert_eq!(options[0].label, "Document: a.rs");
        assert_eq!(options[1].label, "Folder: src");
        assert_eq!(options[2].label, "Folder and subfolders: src");
    }

    #[test]
    fn test_scope_options_without_folder() {
        let options = ScopeResolver::default().scope_options(&loc("untitled:Untitled-1"));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].scope, Scope::Document);
    }

    #[test]
    fn test_folder_hierarchy_innermost_first() {
        let folders = ScopeResolver::default().folder_hierarchy(&loc("file:///w/src/a.rs"));
        let folders: Vec<&str> = folders.iter().map(Location::as_str).collect();
        assert_eq!(folders, vec!["file:///w/src", "file:///w", "file:///"]);
    }

    #[test]
    fn test_folder_hierarchy_is_bounded() {
        let deep = format!("file:///{}f.rs", "d/".repeat(80));
        let folders = ScopeResolver::default().folder_hierarchy(&loc(&deep));
        assert_eq!(folders.len(), MAX_HIERARCHY_DEPTH);
        assert_eq!(ScopeResolver::new(3).folder_hierarchy(&loc(&deep)).len(), 3);
    }

    #[test]
    fn test_candidate_keys() {
        let keys = ScopeResolver::default().candidate_keys(&loc("file:///w/a.rs"));
        assert_eq!(
            keys.as_slice(),
            [
                ScopeKey::document(loc("file:///w/a.rs")),
                ScopeKey::folder(loc("file:///w"), false),
                ScopeKey::folder(loc("file:///w"), true),
                ScopeKey::folder(loc("file:///"), true),
            ]
        );
    }
}
