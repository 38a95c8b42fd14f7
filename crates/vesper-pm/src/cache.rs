//! Module artifact cache
//!
//! Local store keyed by (dependency name, resolved version) at
//! `~/.vesper/cache/`. Each entry is a directory `<name>/<version>/`
//! holding the artifact (`module.vsp`) and a `metadata.json` sidecar with
//! a SHA-256 checksum that is verified on every read.
//!
//! Writes are staged under `<root>/tmp/` and renamed into place, so an
//! interrupted or concurrent writer never leaves a partial entry visible.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::semver::Version;

/// Filename of the artifact inside a cache entry directory.
const MODULE_FILENAME: &str = "module.vsp";

/// Filename of the metadata sidecar inside a cache entry directory.
const METADATA_FILENAME: &str = "metadata.json";

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error (file operations)
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache directory creation failed
    #[error("failed to initialize cache: {0}")]
    Init(String),

    /// Entry not present in the cache
    #[error("not cached: {name}@{version}")]
    NotFound { name: String, version: String },

    /// Stored payload does not match its recorded checksum
    #[error("checksum mismatch for {name}@{version}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        version: String,
        expected: String,
        actual: String,
    },

    /// Metadata sidecar is missing or unreadable
    #[error("cache metadata error for {name}@{version}: {reason}")]
    Metadata {
        name: String,
        version: String,
        reason: String,
    },
}

/// Metadata sidecar stored next to each cached artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryMetadata {
    /// Dependency name
    pub name: String,

    /// Resolved version the artifact was fetched at
    pub version: String,

    /// SHA-256 of the artifact, hex-encoded
    pub checksum: String,
}

/// Artifact cache keyed by (name, resolved version)
#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    /// Open the user-scoped cache at `~/.vesper/cache/`, creating the
    /// directory structure if needed.
    pub fn init() -> Result<Self, CacheError> {
        let home = dirs::home_dir()
            .ok_or_else(|| CacheError::Init("could not determine home directory".to_string()))?;
        Self::at(home.join(".vesper").join("cache"))
    }

    /// Open a cache rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        fs::create_dir_all(root.join("tmp"))?;
        Ok(Self { root })
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether an entry exists for `(name, version)`.
    ///
    /// Only fully published entries are visible; in-flight writes live under
    /// `tmp/` and never satisfy this check.
    pub fn has(&self, name: &str, version: &Version) -> bool {
        let dir = self.entry_dir(name, version);
        dir.join(MODULE_FILENAME).exists() && dir.join(METADATA_FILENAME).exists()
    }

    /// Read the cached artifact for `(name, version)`, verifying its
    /// checksum against the metadata sidecar.
    pub fn read(&self, name: &str, version: &Version) -> Result<Vec<u8>, CacheError> {
        if !self.has(name, version) {
            return Err(CacheError::NotFound {
                name: name.to_string(),
                version: version.to_string(),
            });
        }

        let dir = self.entry_dir(name, version);
        let bytes = fs::read(dir.join(MODULE_FILENAME))?;

        let metadata = self.read_metadata(name, version)?;
        let actual = hex::encode(Sha256::digest(&bytes));
        if actual != metadata.checksum {
            return Err(CacheError::ChecksumMismatch {
                name: name.to_string(),
                version: version.to_string(),
                expected: metadata.checksum,
                actual,
            });
        }

        Ok(bytes)
    }

    /// Store an artifact for `(name, version)`.
    ///
    /// The entry is assembled under `tmp/` and atomically renamed into
    /// place; a superseded entry for the same key is replaced.
    pub fn write(&self, name: &str, version: &Version, bytes: &[u8]) -> Result<(), CacheError> {
        let metadata = EntryMetadata {
            name: name.to_string(),
            version: version.to_string(),
            checksum: hex::encode(Sha256::digest(bytes)),
        };

        // Stage in a process-unique directory on the same filesystem
        let stage = self.root.join("tmp").join(format!(
            "{}-{}-{}",
            name,
            version,
            std::process::id()
        ));
        fs::create_dir_all(&stage)?;

        let mut module_file = fs::File::create(stage.join(MODULE_FILENAME))?;
        module_file.write_all(bytes)?;
        module_file.sync_all()?;
        drop(module_file);

        let metadata_json = serde_json::to_string_pretty(&metadata).map_err(|e| {
            CacheError::Metadata {
                name: name.to_string(),
                version: version.to_string(),
                reason: e.to_string(),
            }
        })?;
        fs::write(stage.join(METADATA_FILENAME), metadata_json)?;

        let final_dir = self.entry_dir(name, version);
        if let Some(parent) = final_dir.parent() {
            fs::create_dir_all(parent)?;
        }
        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&stage, &final_dir)?;

        Ok(())
    }

    /// Remove every published entry. Staged writes under `tmp/` are left
    /// for their owning processes.
    pub fn clear(&self) -> Result<(), CacheError> {
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() && path.file_name() != Some("tmp".as_ref()) {
                fs::remove_dir_all(&path)?;
            }
        }
        Ok(())
    }

    /// Directory for one cache entry. The key nests as `<name>/<version>/`,
    /// which keeps it injective for hyphenated names and means any two
    /// constraints that resolve to the same version share the entry.
    fn entry_dir(&self, name: &str, version: &Version) -> PathBuf {
        self.root.join(name).join(version.to_string())
    }

    fn read_metadata(&self, name: &str, version: &Version) -> Result<EntryMetadata, CacheError> {
        let path = self.entry_dir(name, version).join(METADATA_FILENAME);
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| CacheError::Metadata {
            name: name.to_string(),
            version: version.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache() -> (tempfile::TempDir, Cache) {
        let temp = tempfile::tempdir().unwrap();
        let cache = Cache::at(temp.path().join("cache")).unwrap();
        (temp, cache)
    }

    #[test]
    fn test_write_and_read() {
        let (_temp, cache) = temp_cache();
        let v = Version::new(1, 0, 0);

        cache.write("http", &v, b"module payload").unwrap();

        assert!(cache.has("http", &v));
        assert_eq!(cache.read("http", &v).unwrap(), b"module payload");
    }

    #[test]
    fn test_miss_is_not_found() {
        let (_temp, cache) = temp_cache();
        let v = Version::new(1, 0, 0);

        assert!(!cache.has("http", &v));
        assert!(matches!(
            cache.read("http", &v),
            Err(CacheError::NotFound { .. })
        ));
    }

    #[test]
    fn test_same_version_shares_entry() {
        let (_temp, cache) = temp_cache();
        let v = Version::new(2, 0, 0);

        cache.write("beta", &v, b"payload").unwrap();

        // A second resolution to the same version lands on the same entry
        assert!(cache.has("beta", &Version::parse("2.0.0").unwrap()));
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let (_temp, cache) = temp_cache();
        let v = Version::new(1, 0, 0);

        cache.write("http", &v, b"old").unwrap();
        cache.write("http", &v, b"new").unwrap();

        assert_eq!(cache.read("http", &v).unwrap(), b"new");
    }

    #[test]
    fn test_corrupted_payload_detected() {
        let (_temp, cache) = temp_cache();
        let v = Version::new(1, 0, 0);

        cache.write("http", &v, b"payload").unwrap();

        let module_path = cache.root().join("http").join("1.0.0").join(MODULE_FILENAME);
        fs::write(&module_path, b"tampered").unwrap();

        assert!(matches!(
            cache.read("http", &v),
            Err(CacheError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_staged_writes_invisible() {
        let (_temp, cache) = temp_cache();
        let v = Version::new(1, 0, 0);

        // Simulate an in-flight write abandoned in the staging area
        let stage = cache.root().join("tmp").join("http-1.0.0-999");
        fs::create_dir_all(&stage).unwrap();
        fs::write(stage.join(MODULE_FILENAME), b"partial").unwrap();

        assert!(!cache.has("http", &v));
    }

    #[test]
    fn test_hyphenated_names_do_not_collide() {
        let (_temp, cache) = temp_cache();

        // "a-1.0.0" at 2.0.0 and "a" at 1.0.0-2.0.0 render the same under
        // a flat "<name>-<version>" key
        cache
            .write("a-1.0.0", &Version::new(2, 0, 0), b"first")
            .unwrap();
        cache
            .write("a", &Version::parse("1.0.0-2.0.0").unwrap(), b"second")
            .unwrap();

        assert_eq!(
            cache.read("a-1.0.0", &Version::new(2, 0, 0)).unwrap(),
            b"first"
        );
        assert_eq!(
            cache
                .read("a", &Version::parse("1.0.0-2.0.0").unwrap())
                .unwrap(),
            b"second"
        );
    }

    #[test]
    fn test_clear() {
        let (_temp, cache) = temp_cache();
        let v = Version::new(1, 0, 0);

        cache.write("http", &v, b"payload").unwrap();
        cache.clear().unwrap();

        assert!(!cache.has("http", &v));
    }
}
