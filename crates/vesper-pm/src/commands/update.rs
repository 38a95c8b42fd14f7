//! The `update` command

use std::path::Path;

use thiserror::Error;

use crate::commands::PmContext;
use crate::manifest::{find_project_root, Manifest, ManifestError, MANIFEST_FILENAME};
use crate::planner::{InstallPlanner, RunSummary};
use crate::progress::ProgressReporter;
use crate::registry::RegistryError;
use crate::CacheError;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("no {MANIFEST_FILENAME} found here or in any parent directory")]
    NoManifest,

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to persist updated manifest: {0}")]
    ManifestWrite(ManifestError),
}

/// Update every dependency in the nearest manifest to the latest published
/// version, rewriting constraints to `^latest` for entries that installed.
///
/// The manifest is rewritten atomically, and only when at least one
/// constraint actually changed. A failure to persist the rewrite is fatal:
/// modules on disk would otherwise disagree with the recorded constraints.
pub fn update_dependencies(
    ctx: &PmContext,
    start_dir: &Path,
    reporter: &mut dyn ProgressReporter,
) -> Result<RunSummary, UpdateError> {
    let root = find_project_root(start_dir).ok_or(UpdateError::NoManifest)?;
    let manifest_path = root.join(MANIFEST_FILENAME);
    let mut manifest = Manifest::from_file(&manifest_path)?;

    let planner = InstallPlanner::new(
        ctx.open_cache()?,
        ctx.adapters()?,
        ctx.version_source(),
        &root,
    );
    let (summary, changed) = planner.update(&mut manifest, reporter);

    if changed {
        manifest
            .save(&manifest_path)
            .map_err(UpdateError::ManifestWrite)?;
    }
    Ok(summary)
}
