//! Project bootstrap

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::manifest::{Manifest, ManifestError, MANIFEST_FILENAME};

/// Source file written for a fresh project.
const MAIN_FILENAME: &str = "main.vsp";

const MAIN_TEMPLATE: &str = "say \"Hello, world!\"\n";

#[derive(Debug, Error)]
pub enum InitError {
    #[error("a project already exists here ({0} found)")]
    AlreadyExists(String),

    #[error("invalid project name {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Create a new project in `dir`: a `vesper.json` seeded with the standard
/// dependency set and a hello-world `main.vsp`.
///
/// Refuses to run when a manifest already exists. Returns the path of the
/// written manifest.
pub fn init_project(dir: &Path, name: &str) -> Result<PathBuf, InitError> {
    if name.is_empty() || !crate::manifest::is_valid_dependency_name(name) {
        return Err(InitError::InvalidName(name.to_string()));
    }
    let manifest_path = dir.join(MANIFEST_FILENAME);
    if manifest_path.exists() {
        return Err(InitError::AlreadyExists(MANIFEST_FILENAME.to_string()));
    }

    let manifest = Manifest::bootstrap(name);
    manifest.save(&manifest_path)?;

    let main_path = dir.join(MAIN_FILENAME);
    if !main_path.exists() {
        fs::write(&main_path, MAIN_TEMPLATE).map_err(|source| InitError::Io {
            path: main_path.clone(),
            source,
        })?;
    }
    Ok(manifest_path)
}
