//! Operations exposed to the CLI
//!
//! Each command takes a [`PmContext`] describing where the registry, the
//! cache, and the latest-version source live, so tests can point all three
//! at local fixtures.

mod init;
mod install;
mod update;

pub use init::{init_project, InitError};
pub use install::{install_dependencies, InstallError};
pub use update::{update_dependencies, UpdateError};

use std::env;
use std::path::PathBuf;

use crate::adapter::AdapterSet;
use crate::registry::{RegistryClient, RegistryError, DEFAULT_REGISTRY};
use crate::semver::Version;
use crate::versions::{PinnedLatest, VersionSource};
use crate::{Cache, CacheError};

/// Environment variable overriding the registry base URL.
pub const ENV_REGISTRY: &str = "VESPER_REGISTRY";

/// Environment variable overriding the cache directory.
pub const ENV_CACHE_DIR: &str = "VESPER_CACHE_DIR";

/// Environment variable overriding the latest published version.
pub const ENV_LATEST: &str = "VESPER_LATEST";

/// Where a command run finds its registry, cache, and version source.
pub struct PmContext {
    pub registry_url: String,
    pub cache_dir: Option<PathBuf>,
    pub latest: Option<Version>,
}

impl PmContext {
    /// Build a context from the process environment.
    ///
    /// `VESPER_REGISTRY`, `VESPER_CACHE_DIR`, and `VESPER_LATEST` override
    /// the registry URL, the cache location, and the pinned latest version.
    /// A malformed `VESPER_LATEST` is ignored.
    pub fn from_env() -> Self {
        let registry_url =
            env::var(ENV_REGISTRY).unwrap_or_else(|_| DEFAULT_REGISTRY.to_string());
        let cache_dir = env::var_os(ENV_CACHE_DIR).map(PathBuf::from);
        let latest = env::var(ENV_LATEST)
            .ok()
            .and_then(|raw| Version::parse(&raw).ok());
        PmContext {
            registry_url,
            cache_dir,
            latest,
        }
    }

    pub(crate) fn open_cache(&self) -> Result<Cache, CacheError> {
        match &self.cache_dir {
            Some(dir) => Cache::at(dir.clone()),
            None => Cache::init(),
        }
    }

    pub(crate) fn adapters(&self) -> Result<AdapterSet, RegistryError> {
        let client = RegistryClient::with_url(&self.registry_url)?;
        Ok(AdapterSet::with_defaults(client))
    }

    pub(crate) fn version_source(&self) -> Box<dyn VersionSource> {
        match &self.latest {
            Some(v) => Box::new(PinnedLatest::new(v.clone())),
            None => Box::new(PinnedLatest::default()),
        }
    }
}
