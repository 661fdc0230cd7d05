//! Document and folder locations.
//!
//! A [`Location`] is a URI-like identity (`file:///src/main.rs`,
//! `untitled:Untitled-1`). Locations whose path starts with `/` are
//! hierarchical: they have a containing folder and ancestors. Every other
//! location stands alone and can only be targeted by document scope.
//!
//! Construction canonicalizes path separators and trailing slashes, so the
//! stored string is stable for ordering. Case folding is applied only when
//! comparing ([`Location::same_location`]) because it depends on the scheme
//! and the platform.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::LocationError;

/// Identity of a document or folder.
///
/// Ordering and hashing use the canonical URI string, which is what cross
/// document navigation sorts by.
///
/// # Examples
///
/// ```
/// use hl_core::Location;
///
/// let doc = Location::parse("file:///work/src/lib.rs").unwrap();
/// assert_eq!(doc.path(), "/work/src/lib.rs");
/// assert_eq!(doc.parent().unwrap().as_str(), "file:///work/src");
/// assert_eq!(doc.file_name(), Some("lib.rs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location {
    uri: String,
}

/// Borrowed pieces of a canonical URI.
struct Parts<'a> {
    scheme: &'a str,
    authority: Option<&'a str>,
    path: &'a str,
}

impl Location {
    /// Parses a URI, or an absolute filesystem path which becomes a `file` URI.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Empty`] for blank input and
    /// [`LocationError::Invalid`] when the input has neither a scheme nor an
    /// absolute path.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(LocationError::Empty);
        }

        if let Some(scheme_len) = scheme_length(input) {
            let scheme = input[..scheme_len].to_ascii_lowercase();
            let rest = &input[scheme_len + 1..];
            let (authority, path) = match rest.strip_prefix("//") {
                Some(after) => {
                    let split = after.find(['/', '\\']).unwrap_or(after.len());
                    (Some(&after[..split]), &after[split..])
                }
                None => (None, rest),
            };
            return Ok(Self {
                uri: compose(&scheme, authority, &canonical_path(path)),
            });
        }

        if input.starts_with('/') || input.starts_with('\\') || has_drive_prefix(input) {
            return Ok(Self::from_path(Utf8Path::new(input)));
        }

        Err(LocationError::invalid(input, "expected a URI or an absolute path"))
    }

    /// Builds a `file` location from a filesystem path.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        let mut path = canonical_path(path.as_str());
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            uri: compose("file", Some(""), &path),
        }
    }

    /// Returns the canonical URI string.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Returns the lowercase scheme (`file`, `untitled`, ...).
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.parts().scheme
    }

    /// Returns the path component.
    #[must_use]
    pub fn path(&self) -> &str {
        self.parts().path
    }

    /// Returns `true` when the location has folders above it.
    #[must_use]
    pub fn is_hierarchical(&self) -> bool {
        self.path().starts_with('/')
    }

    /// Returns the last path segment.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        let path = self.path();
        let name = path.rsplit('/').next().unwrap_or(path);
        (!name.is_empty()).then_some(name)
    }

    /// Returns the containing folder, or `None` for non-hierarchical
    /// locations and the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parts = self.parts();
        if !parts.path.starts_with('/') || parts.path == "/" {
            return None;
        }
        let cut = parts.path.rfind('/')?;
        let parent = if cut == 0 { "/" } else { &parts.path[..cut] };
        Some(Self {
            uri: compose(parts.scheme, parts.authority, parent),
        })
    }

    /// Appends a path segment.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let parts = self.parts();
        let segment = segment.trim_matches(['/', '\\']);
        let path = if parts.path.ends_with('/') {
            format!("{}{segment}", parts.path)
        } else {
            format!("{}/{segment}", parts.path)
        };
        Self {
            uri: compose(parts.scheme, parts.authority, &canonical_path(&path)),
        }
    }

    /// Converts a `file` location back into a filesystem path.
    #[must_use]
    pub fn to_file_path(&self) -> Option<Utf8PathBuf> {
        let parts = self.parts();
        if parts.scheme != "file" {
            return None;
        }
        let path = parts.path;
        // `/C:/dir` is a drive path on Windows hosts.
        if cfg!(windows) && has_drive_prefix(path.trim_start_matches('/')) {
            return Some(Utf8PathBuf::from(path.trim_start_matches('/')));
        }
        Some(Utf8PathBuf::from(path))
    }

    /// Returns the comparison key: the canonical URI, case folded when the
    /// scheme is case-insensitive on this platform.
    #[must_use]
    pub fn normalized_key(&self) -> String {
        if folds_case(self.scheme()) {
            self.uri.to_lowercase()
        } else {
            self.uri.clone()
        }
    }

    /// Compares two locations after normalization.
    #[must_use]
    pub fn same_location(&self, other: &Self) -> bool {
        self.normalized_key() == other.normalized_key()
    }

    /// Returns `true` if `self` lies strictly below `ancestor`.
    ///
    /// The check respects segment boundaries, so `/foobar` is not below `/foo`.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Self) -> bool {
        if !self.is_hierarchical() || !ancestor.is_hierarchical() {
            return false;
        }
        let me = self.normalized_key();
        let base = ancestor.normalized_key();
        if me.len() <= base.len() || !me.starts_with(&base) {
            return false;
        }
        base.ends_with('/') || me.as_bytes()[base.len()] == b'/'
    }

    fn parts(&self) -> Parts<'_> {
        let colon = self.uri.find(':').unwrap_or(0);
        let scheme = &self.uri[..colon];
        let rest = &self.uri[colon + 1..];
        match rest.strip_prefix("//") {
            Some(after) => {
                let split = after.find('/').unwrap_or(after.len());
                Parts {
                    scheme,
                    authority: Some(&after[..split]),
                    path: &after[split..],
                }
            }
            None => Parts {
                scheme,
                authority: None,
                path: rest,
            },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl TryFrom<String> for Location {
    type Error = LocationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.uri
    }
}

impl std::str::FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Length of a leading URI scheme, if any.
///
/// Single letters are rejected so `C:\dir` stays a path.
fn scheme_length(input: &str) -> Option<usize> {
    let colon = input.find(':')?;
    let scheme = &input[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && scheme.len() >= 2
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(colon)
}

fn has_drive_prefix(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Converts separators to `/`, collapses duplicate slashes, and drops a
/// trailing slash (except for the root).
fn canonical_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' && previous_slash {
            continue;
        }
        previous_slash = c == '/';
        out.push(c);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

fn compose(scheme: &str, authority: Option<&str>, path: &str) -> String {
    match authority {
        Some(authority) => format!("{scheme}://{authority}{path}"),
        None => format!("{scheme}:{path}"),
    }
}

fn folds_case(scheme: &str) -> bool {
    scheme == "file" && cfg!(any(windows, target_os = "macos"))
}
