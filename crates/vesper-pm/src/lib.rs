//! Vesper package manager
//!
//! Everything needed to resolve, fetch, cache, and place Vesper modules:
//!
//! - [`manifest`]: the `vesper.json` project manifest
//! - [`semver`]: versions and caret/exact constraints
//! - [`cache`]: the content-addressed local module cache
//! - [`registry`]: HTTP client for the module registry
//! - [`ecosystem`] / [`adapter`]: dispatch between registry fetches and
//!   foreign-toolchain installs
//! - [`planner`]: the install/update state machine
//! - [`commands`]: the operations the CLI exposes

pub mod adapter;
pub mod cache;
pub mod commands;
pub mod ecosystem;
pub mod manifest;
pub mod planner;
pub mod progress;
pub mod registry;
pub mod semver;
pub mod versions;

pub use cache::{Cache, CacheError};
pub use manifest::{Manifest, ManifestError, MANIFEST_FILENAME};
pub use planner::{InstallPlanner, RunSummary, MODULES_DIR};
pub use progress::{InstallOutcome, NullReporter, ProgressReporter};
pub use semver::{Constraint, SemverError, Version};
