//! The `install` command

use std::path::Path;

use thiserror::Error;

use crate::commands::PmContext;
use crate::manifest::{find_project_root, Manifest, ManifestError, MANIFEST_FILENAME};
use crate::planner::{InstallPlanner, RunSummary};
use crate::progress::ProgressReporter;
use crate::registry::RegistryError;
use crate::CacheError;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("no {MANIFEST_FILENAME} found here or in any parent directory")]
    NoManifest,

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Install every dependency listed in the nearest manifest.
///
/// Per-dependency failures are recorded in the summary, not raised; only
/// problems that prevent the run from starting at all (no manifest, an
/// unreadable cache) are errors.
pub fn install_dependencies(
    ctx: &PmContext,
    start_dir: &Path,
    reporter: &mut dyn ProgressReporter,
) -> Result<RunSummary, InstallError> {
    let root = find_project_root(start_dir).ok_or(InstallError::NoManifest)?;
    let manifest = Manifest::from_file(&root.join(MANIFEST_FILENAME))?;

    let planner = InstallPlanner::new(
        ctx.open_cache()?,
        ctx.adapters()?,
        ctx.version_source(),
        &root,
    );
    Ok(planner.install(&manifest, reporter))
}
