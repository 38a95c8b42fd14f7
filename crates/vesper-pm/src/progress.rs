//! Planner progress observation
//!
//! The planner reports through this narrow interface; rendering lives
//! entirely with the caller (the CLI supplies a colored console reporter,
//! tests use [`NullReporter`]).

use std::fmt;

/// Per-dependency result of one planner pass. Ephemeral: reported, counted,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Placed from the local cache, no network involved
    CachedHit,

    /// Fetched from the registry and placed
    Fetched,

    /// Installed by a foreign ecosystem's own toolchain
    Delegated,

    /// Update pass: the constraint already accepts the latest version
    UpToDate,

    /// This entry failed; the rest of the run continues
    Failed(String),
}

impl InstallOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, InstallOutcome::Failed(_))
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::CachedHit => f.write_str("cached"),
            InstallOutcome::Fetched => f.write_str("fetched"),
            InstallOutcome::Delegated => f.write_str("delegated"),
            InstallOutcome::UpToDate => f.write_str("up to date"),
            InstallOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Observer of planner progress.
pub trait ProgressReporter {
    /// Work on one manifest entry has begun.
    fn entry_started(&mut self, _name: &str, _constraint: &str) {}

    /// One manifest entry reached a terminal outcome.
    fn entry_finished(&mut self, _name: &str, _outcome: &InstallOutcome) {}

    /// One manifest entry failed; also receives `entry_finished`.
    fn entry_failed(&mut self, _name: &str, _reason: &str) {}

    /// A non-fatal condition worth surfacing (e.g. a cache write failure
    /// after a successful install).
    fn warning(&mut self, _message: &str) {}
}

/// Reporter that discards all events.
pub struct NullReporter;

impl ProgressReporter for NullReporter {}
