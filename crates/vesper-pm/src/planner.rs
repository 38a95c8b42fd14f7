//! Install and update planning
//!
//! [`InstallPlanner`] walks a manifest's dependency table and drives each
//! entry to a terminal [`InstallOutcome`]. Failures never abort the run:
//! each entry is isolated, and the caller inspects the [`RunSummary`] to
//! decide the process exit status.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use crate::adapter::{Acquisition, AdapterSet};
use crate::progress::{InstallOutcome, ProgressReporter};
use crate::semver::{Constraint, Version};
use crate::versions::VersionSource;
use crate::Cache;
use crate::Manifest;

/// Directory (relative to the project root) where resolved modules land.
pub const MODULES_DIR: &str = "vesper_modules";

/// File extension for placed module payloads.
pub const MODULE_EXT: &str = "vsp";

/// Ordered record of one planner pass over a manifest.
#[derive(Debug, Default)]
pub struct RunSummary {
    entries: Vec<(String, InstallOutcome)>,
}

impl RunSummary {
    pub fn record(&mut self, name: impl Into<String>, outcome: InstallOutcome) {
        self.entries.push((name.into(), outcome));
    }

    /// Per-entry outcomes in manifest iteration order.
    pub fn entries(&self) -> &[(String, InstallOutcome)] {
        &self.entries
    }

    pub fn succeeded(&self) -> usize {
        self.entries.len() - self.failed()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Names of the entries that failed, in order.
    pub fn failures(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, o)| o.is_failure())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drives manifest dependencies to installed modules.
///
/// Owns the module cache, the ecosystem adapter table, and the version
/// source used by update passes. All per-entry errors are converted to
/// [`InstallOutcome::Failed`]; the planner's public methods never fail.
pub struct InstallPlanner {
    cache: Cache,
    adapters: AdapterSet,
    versions: Box<dyn VersionSource>,
    module_dir: PathBuf,
}

impl InstallPlanner {
    pub fn new(
        cache: Cache,
        adapters: AdapterSet,
        versions: Box<dyn VersionSource>,
        project_root: &Path,
    ) -> Self {
        InstallPlanner {
            cache,
            adapters,
            versions,
            module_dir: project_root.join(MODULES_DIR),
        }
    }

    /// Path a module payload is placed at.
    pub fn module_path(&self, name: &str) -> PathBuf {
        self.module_dir.join(format!("{}.{}", name, MODULE_EXT))
    }

    /// Install every dependency in the manifest.
    ///
    /// Each entry is resolved against its constraint, acquired (cache,
    /// registry, or a delegated toolchain), and placed. A malformed
    /// constraint or a failed acquisition marks only that entry as failed.
    pub fn install(&self, manifest: &Manifest, reporter: &mut dyn ProgressReporter) -> RunSummary {
        let mut summary = RunSummary::default();
        for (name, raw) in &manifest.dependencies {
            reporter.entry_started(name, raw);
            let outcome = self.install_entry(name, raw, reporter);
            if let InstallOutcome::Failed(reason) = &outcome {
                reporter.entry_failed(name, reason);
            }
            reporter.entry_finished(name, &outcome);
            summary.record(name, outcome);
        }
        summary
    }

    /// Update every dependency to the latest published version.
    ///
    /// Entries whose constraint already accepts the latest version are left
    /// untouched. For the rest, the latest version is installed and the
    /// manifest constraint is rewritten to `^latest`, but only when the
    /// install succeeds. Returns the summary and whether the manifest
    /// changed (the caller persists it).
    pub fn update(
        &self,
        manifest: &mut Manifest,
        reporter: &mut dyn ProgressReporter,
    ) -> (RunSummary, bool) {
        let mut summary = RunSummary::default();
        let mut rewrites: Vec<(String, String)> = Vec::new();

        for (name, raw) in &manifest.dependencies {
            reporter.entry_started(name, raw);
            let outcome = self.update_entry(name, raw, &mut rewrites, reporter);
            if let InstallOutcome::Failed(reason) = &outcome {
                reporter.entry_failed(name, reason);
            }
            reporter.entry_finished(name, &outcome);
            summary.record(name, outcome);
        }

        let changed = !rewrites.is_empty();
        for (name, constraint) in rewrites {
            manifest.dependencies.insert(name, constraint);
        }
        (summary, changed)
    }

    fn install_entry(
        &self,
        name: &str,
        raw: &str,
        reporter: &mut dyn ProgressReporter,
    ) -> InstallOutcome {
        let constraint = match Constraint::parse(raw) {
            Ok(c) => c,
            Err(e) => return InstallOutcome::Failed(e.to_string()),
        };
        let version = self.resolve(name, &constraint);
        self.acquire_and_place(name, &version, reporter)
    }

    fn update_entry(
        &self,
        name: &str,
        raw: &str,
        rewrites: &mut Vec<(String, String)>,
        reporter: &mut dyn ProgressReporter,
    ) -> InstallOutcome {
        let constraint = match Constraint::parse(raw) {
            Ok(c) => c,
            Err(e) => return InstallOutcome::Failed(e.to_string()),
        };
        let latest = match self.versions.latest(name) {
            Ok(v) => v,
            Err(e) => return InstallOutcome::Failed(e.to_string()),
        };
        if constraint.is_up_to_date(&latest) {
            return InstallOutcome::UpToDate;
        }
        let outcome = self.acquire_and_place(name, &latest, reporter);
        if !outcome.is_failure() {
            rewrites.push((name.to_string(), format!("^{}", latest)));
        }
        outcome
    }

    /// Pick the version to install for a constraint. The latest published
    /// version wins when the constraint accepts it; otherwise the
    /// constraint's own base version is used.
    fn resolve(&self, name: &str, constraint: &Constraint) -> Version {
        // Version sources can fail (a remote index, say); installs fall
        // back to the constraint base rather than failing the entry.
        match self.versions.latest(name) {
            Ok(latest) if constraint.matches(&latest) => latest,
            _ => constraint.base_version().clone(),
        }
    }

    fn acquire_and_place(
        &self,
        name: &str,
        version: &Version,
        reporter: &mut dyn ProgressReporter,
    ) -> InstallOutcome {
        if self.adapters.is_delegated(name) {
            return match self.adapters.acquire(name, version) {
                Ok(Acquisition::Delegated) => InstallOutcome::Delegated,
                // Delegated adapters never return a payload.
                Ok(Acquisition::Payload(_)) => {
                    InstallOutcome::Failed("delegated adapter returned a payload".into())
                }
                Err(e) => InstallOutcome::Failed(e.to_string()),
            };
        }

        if self.cache.has(name, version) {
            match self.cache.read(name, version) {
                Ok(payload) => {
                    return match self.place(name, &payload) {
                        Ok(()) => InstallOutcome::CachedHit,
                        Err(e) => InstallOutcome::Failed(e.to_string()),
                    }
                }
                // An unreadable entry is a miss; the refetch below
                // overwrites it.
                Err(e) => {
                    reporter.warning(&format!("discarding cached {} {}: {}", name, version, e));
                }
            }
        }

        let payload = match self.adapters.acquire(name, version) {
            Ok(Acquisition::Payload(bytes)) => bytes,
            Ok(Acquisition::Delegated) => {
                return InstallOutcome::Failed("registry adapter delegated an install".into())
            }
            Err(e) => return InstallOutcome::Failed(e.to_string()),
        };

        if let Err(e) = self.place(name, &payload) {
            return InstallOutcome::Failed(e.to_string());
        }
        // The module is already in place; a cache write failure only costs
        // the next run a refetch.
        if let Err(e) = self.cache.write(name, version, &payload) {
            reporter.warning(&format!("failed to cache {} {}: {}", name, version, e));
        }
        InstallOutcome::Fetched
    }

    /// Atomically place a module payload under the modules directory.
    fn place(&self, name: &str, payload: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.module_dir)?;
        let final_path = self.module_path(name);
        let tmp_path = self
            .module_dir
            .join(format!(".{}.{}.tmp", name, process::id()));
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(payload)?;
        file.sync_all()?;
        drop(file);
        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }
}
