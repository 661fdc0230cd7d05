//! The scoped highlight rule engine.
//!
//! This crate keeps highlight rules, re-evaluates them against live
//! document text and folder scopes, and navigates between their matches
//! across files. It talks to its editor through the [`Host`] trait and to
//! the file system through [`hl_scanner::FileSource`].
//!
//! # Overview
//!
//! - [`Engine`]: the facade; rule operations, host events, scans,
//!   navigation, and [`EngineEvent`] notifications
//! - [`RuleStore`]: rules bucketed by `(scope, target)` with validation
//!   before every mutation
//! - [`ScopeResolver`]: scope identities and choices for a document
//! - [`NavigationIndex`]: per-document match statistics and the global
//!   match order
//! - [`DecorationStyle`] / [`Decoration`]: what a rule paints with, owned by
//!   exactly one rule
//! - [`MemoryHost`]: an in-memory [`Host`] for tests and headless use
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hl_core::{Config, Location, RuleDraft, Scope};
//! use hl_engine::{Direction, Engine, MemoryHost};
//! use hl_scanner::MemorySource;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), hl_engine::EngineError> {
//! let source = Arc::new(MemorySource::new());
//! source.insert(Location::parse("mem:/w/a.txt").unwrap(), "todo");
//! source.insert(Location::parse("mem:/w/b.txt").unwrap(), "todo todo");
//!
//! let host = Arc::new(MemoryHost::new().with_loader(source.clone()));
//! let engine = Engine::new(host, source, &Config::default())?;
//!
//! let doc = Location::parse("mem:/w/a.txt").unwrap();
//! let id = engine.create_rule(&doc, RuleDraft::new("todo", "#ffcc00"), Some(Scope::Folder))?;
//! engine.wait_for_scans().await;
//!
//! let target = engine.navigate(id, Direction::Previous, None)?;
//! assert_eq!(target.global_index, 3);
//! assert_eq!(target.document.file_name(), Some("b.txt"));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Engine (Mutex<State>)
//!     │
//!     ├── RuleStore ── Rule ── CompiledMatcher, FileFilter, Decoration
//!     │
//!     ├── NavigationIndex ── BTreeMap<Location, DocumentMatchStats>
//!     │
//!     ├── ScanTracker ── tokio::spawn ── spawn_blocking(ScopeScanner)
//!     │
//!     └── Host (documents, selections, decorations)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod decoration;
mod engine;
mod error;
mod host;
mod memory;
mod navigation;
mod resolver;
mod snapshot;
mod store;

pub use decoration::{Decoration, DecorationId, DecorationStyle};
pub use engine::{Engine, EngineEvent};
pub use error::EngineError;
pub use host::Host;
pub use memory::MemoryHost;
pub use navigation::{
    Direction, DocumentMatchStats, NavigationIndex, NavigationOrigin, NavigationTarget,
    selection_match_index,
};
pub use resolver::{MAX_HIERARCHY_DEPTH, ScopeResolver};
pub use snapshot::RuleSnapshot;
pub use store::{Rule, RuleStore};
