//! Error types for the hl-core crate.
//!
//! This module provides [`ConfigError`] for configuration loading and
//! [`LocationError`] for document/folder locations that cannot be parsed.

use camino::Utf8PathBuf;

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use hl_core::ConfigError;
///
/// let error = ConfigError::invalid_option("scan.max_files", "must be positive");
/// assert!(error.to_string().contains("scan.max_files"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The configuration file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced when a location string cannot be interpreted.
///
/// Callers resolving scopes treat these as non-fatal and fall back to
/// document scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The location string was empty.
    #[error("location is empty")]
    Empty,

    /// The location string is not a URI and not an absolute path.
    #[error("invalid location '{uri}': {reason}")]
    Invalid {
        /// The rejected input.
        uri: String,
        /// Explanation of why it was rejected.
        reason: &'static str,
    },

    /// The location has no containing folder.
    #[error("location '{0}' has no containing folder")]
    NoContainingFolder(String),
}

impl LocationError {
    /// Creates a new [`LocationError::Invalid`] error.
    #[inline]
    pub fn invalid(uri: impl Into<String>, reason: &'static str) -> Self {
        Self::Invalid {
            uri: uri.into(),
            reason,
        }
    }
}
