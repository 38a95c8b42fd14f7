//! Project manifest parsing (vesper.json)
//!
//! The manifest maps dependency names to version constraints. Top-level
//! fields this crate does not interpret are carried through untouched so
//! that other tooling can extend the manifest format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The canonical manifest filename at the project root.
pub const MANIFEST_FILENAME: &str = "vesper.json";

/// Errors that can occur while reading or writing the manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read or write the manifest file
    #[error("manifest I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the manifest
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// Validation error
    #[error("invalid manifest: {0}")]
    Validation(String),
}

/// Project manifest (vesper.json)
///
/// Dependencies live in a `BTreeMap`, which enforces unique names and gives
/// every run the same deterministic entry order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Project name
    pub name: String,

    /// Project version
    pub version: String,

    /// Dependency name -> constraint expression
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Uninterpreted top-level fields, preserved across rewrites
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Manifest {
    /// Parse a manifest from a file.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a manifest from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.is_empty() {
            return Err(ManifestError::Validation(
                "project name cannot be empty".to_string(),
            ));
        }

        for (name, constraint) in &self.dependencies {
            if name.is_empty() {
                return Err(ManifestError::Validation(
                    "dependency name cannot be empty".to_string(),
                ));
            }
            if !is_valid_dependency_name(name) {
                return Err(ManifestError::Validation(format!(
                    "invalid dependency name '{}': only alphanumerics, hyphens and underscores are allowed",
                    name
                )));
            }
            if constraint.is_empty() {
                return Err(ManifestError::Validation(format!(
                    "dependency '{}' has an empty constraint",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Write the manifest to `path` atomically.
    ///
    /// The new content is staged as a sibling temp file and renamed into
    /// place, so a crash or a concurrent writer never leaves a half-written
    /// manifest behind.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let content = serde_json::to_string_pretty(self)?;

        let tmp_name = format!(
            ".{}.{}.tmp",
            path.file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default(),
            std::process::id()
        );
        let tmp_path = path.with_file_name(tmp_name);

        let mut tmp_file = fs::File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.write_all(b"\n")?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// The fixed dependency set a freshly initialized project starts with:
    /// the native standard modules plus one delegated entry per foreign
    /// ecosystem.
    pub fn bootstrap(name: &str) -> Self {
        let native = [
            "crypto", "fs", "http", "json", "math", "os", "string", "time",
        ];
        let foreign = [
            "csharp_json",
            "java_jython",
            "js_axios",
            "python_requests",
            "ruby_httparty",
            "rust_flate2",
        ];

        let mut dependencies = BTreeMap::new();
        for dep in native.iter().chain(foreign.iter()) {
            dependencies.insert(dep.to_string(), "^1.0.0".to_string());
        }

        Manifest {
            name: name.to_string(),
            version: "0.1.0".to_string(),
            dependencies,
            extra: BTreeMap::new(),
        }
    }
}

/// Validate a dependency name (alphanumerics, hyphens, underscores).
pub fn is_valid_dependency_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Find the project root by walking up from `start_dir` to the nearest
/// directory containing a vesper.json.
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        if current.join(MANIFEST_FILENAME).exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_simple_manifest() {
        let json = r#"{
            "name": "my-project",
            "version": "0.1.0",
            "dependencies": {
                "http": "^1.0.0",
                "json": "^1.2.0"
            }
        }"#;

        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest.name, "my-project");
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.dependencies["http"], "^1.0.0");
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let json = r#"{
            "name": "my-project",
            "version": "0.1.0",
            "description": "a toy",
            "dependencies": {}
        }"#;

        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(
            manifest.extra.get("description"),
            Some(&serde_json::json!("a toy"))
        );

        let rendered = serde_json::to_string(&manifest).unwrap();
        assert!(rendered.contains("\"description\""));
    }

    #[test]
    fn test_empty_name_rejected() {
        let json = r#"{"name": "", "version": "0.1.0"}"#;
        assert!(matches!(
            Manifest::from_json(json),
            Err(ManifestError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_dependency_name_rejected() {
        let json = r#"{
            "name": "p",
            "version": "0.1.0",
            "dependencies": {"bad name": "^1.0.0"}
        }"#;
        assert!(matches!(
            Manifest::from_json(json),
            Err(ManifestError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_constraint_rejected() {
        let json = r#"{
            "name": "p",
            "version": "0.1.0",
            "dependencies": {"http": ""}
        }"#;
        assert!(matches!(
            Manifest::from_json(json),
            Err(ManifestError::Validation(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(MANIFEST_FILENAME);

        let manifest = Manifest::bootstrap("demo");
        manifest.save(&path).unwrap();

        let reloaded = Manifest::from_file(&path).unwrap();
        assert_eq!(reloaded, manifest);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(MANIFEST_FILENAME);

        Manifest::bootstrap("demo").save(&path).unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(MANIFEST_FILENAME)]);
    }

    #[test]
    fn test_bootstrap_set() {
        let manifest = Manifest::bootstrap("demo");
        assert_eq!(manifest.name, "demo");
        assert_eq!(manifest.dependencies["http"], "^1.0.0");
        assert_eq!(manifest.dependencies["python_requests"], "^1.0.0");
        assert!(manifest.dependencies.len() >= 10);
    }

    #[test]
    fn test_find_project_root() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join(MANIFEST_FILENAME), "{}").unwrap();

        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), Some(root.to_path_buf()));
    }

    #[test]
    fn test_find_project_root_missing() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(find_project_root(temp.path()), None);
    }

    #[test]
    fn test_dependency_order_is_deterministic() {
        let json = r#"{
            "name": "p",
            "version": "0.1.0",
            "dependencies": {"zlib": "^1.0.0", "alpha": "^1.0.0", "mid": "^1.0.0"}
        }"#;
        let manifest = Manifest::from_json(json).unwrap();
        let names: Vec<&String> = manifest.dependencies.keys().collect();
        assert_eq!(names, vec!["alpha", "mid", "zlib"]);
    }
}
