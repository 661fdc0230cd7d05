//! Configuration structures for hlscope.
//!
//! This module provides configuration types for every component:
//!
//! - [`EngineConfig`] - Rule engine settings (default scope, filter syntax)
//! - [`ScanConfig`] - Scope scanner settings (caps, excluded directories)
//! - [`WordConfig`] - Fallback whole-word separator characters
//! - [`WatchConfig`] - File watcher settings (debouncing, recursion)
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`], and every section is
//! `#[serde(default)]` so a partial JSON file only overrides what it names.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Scope;

/// Directories never descended into by recursive scope scans.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "dist",
    "build",
    "out",
    "target",
    "coverage",
    "__pycache__",
    ".venv",
    ".next",
    ".turbo",
];

/// Characters that separate words when no language word pattern is known.
pub const DEFAULT_WORD_SEPARATORS: &str = "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

/// Configuration for the rule engine.
///
/// # Examples
///
/// ```
/// use hl_core::{EngineConfig, Scope};
///
/// let config = EngineConfig::default();
/// assert_eq!(config.default_scope, Scope::Document);
/// assert_eq!(config.filter_separators, ",;");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scope used when rule creation does not request one.
    pub default_scope: Scope,

    /// Characters that separate glob patterns in a rule's file filter.
    pub filter_separators: String,

    /// Capacity of the change notification channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_scope: Scope::Document,
            filter_separators: ",;".to_owned(),
            event_capacity: 256,
        }
    }
}

/// Configuration for folder scope scans.
///
/// # Examples
///
/// ```
/// use hl_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.max_files, 5000);
/// assert!(config.exclude_dirs.iter().any(|d| d == "node_modules"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Upper bound on files enumerated by one recursive scan.
    pub max_files: usize,

    /// Directory names skipped by recursive scans.
    pub exclude_dirs: Vec<String>,

    /// Whether to follow symbolic links while walking.
    pub follow_links: bool,

    /// Whether `.gitignore`/`.ignore` files prune the walk.
    pub respect_gitignore: bool,

    /// Maximum number of ancestor folders considered for a document.
    pub max_hierarchy_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_files: 5000,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| (*d).to_owned()).collect(),
            follow_links: false,
            respect_gitignore: true,
            max_hierarchy_depth: 50,
        }
    }
}

/// Whole-word fallback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordConfig {
    /// Separator characters; whitespace is always a separator.
    pub separators: String,
}

impl Default for WordConfig {
    fn default() -> Self {
        Self {
            separators: DEFAULT_WORD_SEPARATORS.to_owned(),
        }
    }
}

/// Configuration for the file watcher.
///
/// # Examples
///
/// ```
/// use hl_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 100);
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds.
    ///
    /// Multiple file changes within this window are batched into a single event.
    pub debounce_ms: u64,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            recursive: true,
        }
    }
}

/// Root configuration for hlscope.
///
/// # Examples
///
/// ```
/// use hl_core::Config;
///
/// let config = Config::default();
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("max_files"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule engine configuration.
    pub engine: EngineConfig,

    /// Scope scanner configuration.
    pub scan: ScanConfig,

    /// Whole-word fallback configuration.
    pub words: WordConfig,

    /// File watcher configuration.
    pub watch: WatchConfig,
}

impl Config {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] for malformed JSON, and
    /// [`ConfigError::InvalidOption`] when a value is out of range.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path.as_std_path()).map_err(|source| ConfigError::Io {
                path: path.to_owned(),
                source,
            })?;
        Self::from_json(&contents)
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.max_files == 0 {
            return Err(ConfigError::invalid_option("scan.max_files", "must be positive"));
        }
        if self.scan.max_hierarchy_depth == 0 {
            return Err(ConfigError::invalid_option(
                "scan.max_hierarchy_depth",
                "must be positive",
            ));
        }
        if self.engine.filter_separators.is_empty() {
            return Err(ConfigError::invalid_option(
                "engine.filter_separators",
                "at least one separator is required",
            ));
        }
        if self.engine.event_capacity == 0 {
            return Err(ConfigError::invalid_option("engine.event_capacity", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.max_files, 5000);
        assert_eq!(config.max_hierarchy_depth, 50);
        assert!(!config.follow_links);
        assert!(config.exclude_dirs.contains(&"target".to_owned()));
    }

    #[test]
    fn test_word_config_defaults() {
        let config = WordConfig::default();
        assert!(config.separators.contains('.'));
        assert!(!config.separators.contains('_'));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"scan": {"max_files": 10}, "engine": {"default_scope": "folderRecursive"}}"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.scan.max_files, 10);
        assert_eq!(config.engine.default_scope, Scope::FolderRecursive);
        // Other fields should have defaults
        assert_eq!(config.scan.max_hierarchy_depth, 50);
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn test_config_rejects_zero_cap() {
        let err = Config::from_json(r#"{"scan": {"max_files": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { .. }));
        assert!(err.to_string().contains("scan.max_files"));
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Utf8Path::new("/nonexistent/hlscope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
