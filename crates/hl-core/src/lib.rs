//! Core types, colors, errors, and configuration for hlscope.
//!
//! This crate provides the foundational types shared by every crate in the
//! workspace:
//!
//! - [`Location`] document and folder identities with scheme-aware
//!   normalization
//! - [`Scope`] and [`ScopeKey`] describing which documents a rule covers
//! - [`RuleId`], [`RuleOptions`] and [`RuleDraft`] for highlight rules
//! - [`TextRange`] and [`Selection`] byte-offset ranges
//! - [`color`] parsing and readable foreground derivation
//! - [`Config`] loaded from JSON with per-section defaults
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod color;
pub mod config;
pub mod error;
pub mod types;

pub use color::{Rgb, parse_color, readable_foreground};
pub use config::{Config, EngineConfig, ScanConfig, WatchConfig, WordConfig};
pub use error::{ConfigError, LocationError};
pub use types::{
    Location, RuleDraft, RuleId, RuleOption, RuleOptions, Scope, ScopeKey, ScopeOption, Selection,
    TextRange,
};

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;
