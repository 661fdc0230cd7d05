//! Per-rule scan coalescing.
//!
//! Each rule is in one of three states:
//!
//! ```text
//!            request                 request
//!   Idle ─────────────▶ Running ─────────────▶ RunningPending
//!    ▲                    │  ▲                       │
//!    │      finish        │  │        finish         │
//!    └────────────────────┘  └───────────────────────┘
//!                                 (rescan once)
//! ```
//!
//! At most one scan is in flight per rule and at most one more is queued,
//! however many requests arrive while it runs.

use hl_core::{FxHashMap, RuleId};
use tracing::trace;

/// Scan state of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No scan is running.
    #[default]
    Idle,
    /// A scan is running and nothing is queued.
    Running,
    /// A scan is running and exactly one more has been requested.
    RunningPending,
}

/// What the caller must do after [`ScanTracker::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Start a scan now.
    Start,
    /// A scan is already running; it will be followed by one rescan.
    Coalesced,
}

/// What the caller must do after [`ScanTracker::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishOutcome {
    /// A request arrived meanwhile; run exactly one more scan.
    Rescan,
    /// The rule is idle again.
    Idle,
}

/// Scan states for every rule. Idle rules are not stored.
///
/// # Examples
///
/// ```
/// use hl_core::RuleId;
/// use hl_scanner::{FinishOutcome, RequestOutcome, ScanTracker};
///
/// let mut tracker = ScanTracker::new();
/// let id = RuleId::new(1);
///
/// assert_eq!(tracker.request(id), RequestOutcome::Start);
/// assert_eq!(tracker.request(id), RequestOutcome::Coalesced);
/// assert_eq!(tracker.request(id), RequestOutcome::Coalesced);
///
/// assert_eq!(tracker.finish(id), FinishOutcome::Rescan);
/// assert_eq!(tracker.finish(id), FinishOutcome::Idle);
/// assert!(tracker.is_idle());
/// ```
#[derive(Debug, Default)]
pub struct ScanTracker {
    states: FxHashMap<RuleId, ScanState>,
}

impl ScanTracker {
    /// Creates a tracker with every rule idle.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scan request for `id`.
    pub fn request(&mut self, id: RuleId) -> RequestOutcome {
        let state = self.states.entry(id).or_default();
        let outcome = match *state {
            ScanState::Idle => {
                *state = ScanState::Running;
                RequestOutcome::Start
            }
            ScanState::Running | ScanState::RunningPending => {
                *state = ScanState::RunningPending;
                RequestOutcome::Coalesced
            }
        };
        trace!(rule = %id, ?outcome, "Scan requested");
        outcome
    }

    /// Records that the running scan for `id` completed.
    ///
    /// On [`FinishOutcome::Rescan`] the rule stays `Running` for the
    /// follow-up scan.
    pub fn finish(&mut self, id: RuleId) -> FinishOutcome {
        match self.states.get(&id).copied().unwrap_or_default() {
            ScanState::RunningPending => {
                self.states.insert(id, ScanState::Running);
                FinishOutcome::Rescan
            }
            ScanState::Running | ScanState::Idle => {
                self.states.remove(&id);
                FinishOutcome::Idle
            }
        }
    }

    /// Drops a queued rescan, used when the rule is deleted mid-scan.
    pub fn cancel_pending(&mut self, id: RuleId) {
        if let Some(state) = self.states.get_mut(&id) {
            if *state == ScanState::RunningPending {
                *state = ScanState::Running;
            }
        }
    }

    /// Current state of `id`.
    #[must_use]
    pub fn state(&self, id: RuleId) -> ScanState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    /// Returns `true` when no scan is running or queued.
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of rules with a scan running.
    #[inline]
    #[must_use]
    pub fn running(&self) -> usize {
        self.states.len()
    }
}
