//! Rule scopes and scope identities.
//!
//! A rule applies to the documents selected by its [`ScopeKey`]: one
//! document, the files directly inside one folder, or every file below a
//! folder.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::Location;

/// The kind of document set a rule covers.
///
/// # Examples
///
/// ```
/// use hl_core::Scope;
///
/// assert!(!Scope::Document.is_folder());
/// assert!(Scope::FolderRecursive.is_folder());
/// assert_eq!(Scope::Folder.label(), "Folder");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    /// A single document.
    #[default]
    Document,

    /// Files directly inside one folder.
    Folder,

    /// A folder and all of its descendants.
    FolderRecursive,
}

impl Scope {
    /// Every scope, in presentation order.
    pub const ALL: [Self; 3] = [Self::Document, Self::Folder, Self::FolderRecursive];

    /// Returns `true` for the folder-based scopes that require scanning.
    #[inline]
    #[must_use]
    pub const fn is_folder(self) -> bool {
        matches!(self, Self::Folder | Self::FolderRecursive)
    }

    /// Human-readable name.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Folder => "Folder",
            Self::FolderRecursive => "Folder and subfolders",
        }
    }

    /// Identifier used in configuration and on the command line.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Folder => "folder",
            Self::FolderRecursive => "folderRecursive",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity a rule belongs to: a scope plus its target location.
///
/// For [`Scope::Document`] the target is the document itself; for folder
/// scopes it is the folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    /// The scope kind.
    pub scope: Scope,
    /// The document or folder the scope is anchored on.
    pub target: Location,
}

impl ScopeKey {
    /// Creates a key.
    #[inline]
    #[must_use]
    pub const fn new(scope: Scope, target: Location) -> Self {
        Self { scope, target }
    }

    /// Document scope on `document`.
    #[inline]
    #[must_use]
    pub const fn document(document: Location) -> Self {
        Self::new(Scope::Document, document)
    }

    /// Folder scope on `folder`, optionally recursive.
    #[inline]
    #[must_use]
    pub const fn folder(folder: Location, recursive: bool) -> Self {
        let scope = if recursive {
            Scope::FolderRecursive
        } else {
            Scope::Folder
        };
        Self::new(scope, folder)
    }

    /// Normalized `(scope, target)` pair used for bucket lookups.
    #[must_use]
    pub fn normalized(&self) -> (Scope, String) {
        (self.scope, self.target.normalized_key())
    }

    /// Compares two keys after location normalization.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.scope == other.scope && self.target.same_location(&other.target)
    }

    /// Returns `true` if `document` falls inside this scope.
    #[must_use]
    pub fn covers(&self, document: &Location) -> bool {
        match self.scope {
            Scope::Document => document.same_location(&self.target),
            Scope::Folder => document
                .parent()
                .is_some_and(|parent| parent.same_location(&self.target)),
            Scope::FolderRecursive => document.is_descendant_of(&self.target),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.target)
    }
}

/// One choice offered to the user when picking a rule's scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeOption {
    /// The scope kind.
    pub scope: Scope,
    /// Where the scope would be anchored.
    pub target: Location,
    /// Display label, e.g. `Folder: src`.
    pub label: String,
}
