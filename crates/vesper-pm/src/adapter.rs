//! Acquisition adapters
//!
//! One adapter per way of obtaining a dependency's artifact: the generic
//! registry path yields a byte payload, the foreign-ecosystem path
//! delegates to that ecosystem's own installer as a subprocess. The
//! [`AdapterSet`] is a dispatch table keyed by ecosystem tag: adding an
//! ecosystem means registering one adapter, not editing a shared switch.

use std::collections::HashMap;
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::ecosystem::{classify, EcosystemTag};
use crate::registry::{RegistryClient, RegistryError};
use crate::semver::Version;

/// Result of a successful acquisition
#[derive(Debug)]
pub enum Acquisition {
    /// Artifact bytes fetched through the generic registry path
    Payload(Vec<u8>),

    /// A foreign toolchain performed the installation itself; there is no
    /// payload to place or cache
    Delegated,
}

/// Errors that can occur during acquisition
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Registry retrieval failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The delegated installer could not be started
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The delegated installer exited with a non-zero status
    #[error("{tool} failed for '{package}' (exit code {exit_code:?})")]
    ToolchainFailed {
        tool: String,
        package: String,
        exit_code: Option<i32>,
    },
}

/// One way of acquiring a dependency's artifact.
pub trait EcosystemAdapter {
    /// Acquire `name` at `version`, either producing artifact bytes or
    /// performing a delegated installation.
    fn acquire(&self, name: &str, version: &Version) -> Result<Acquisition, AdapterError>;
}

/// Generic path: fetch the artifact from the module registry.
pub struct RegistryAdapter {
    client: RegistryClient,
}

impl RegistryAdapter {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }
}

impl EcosystemAdapter for RegistryAdapter {
    fn acquire(&self, name: &str, version: &Version) -> Result<Acquisition, AdapterError> {
        let bytes = self.client.fetch_module(name, version)?;
        Ok(Acquisition::Payload(bytes))
    }
}

/// Foreign path: invoke the ecosystem's own installer as a subprocess.
///
/// Only the exit status is consulted; the installer's output streams to the
/// terminal. The version is not forwarded; the foreign toolchain resolves
/// its own versions.
pub struct ToolchainAdapter {
    program: String,
    args: Vec<String>,
}

impl ToolchainAdapter {
    /// The stock installer invocation for an ecosystem. The package name is
    /// appended to the listed arguments.
    pub fn for_tag(tag: EcosystemTag) -> Self {
        let (program, args): (&str, &[&str]) = match tag {
            EcosystemTag::Python => ("pip3", &["install"]),
            EcosystemTag::Ruby => ("gem", &["install"]),
            EcosystemTag::Rust => ("cargo", &["install"]),
            EcosystemTag::Js => ("npm", &["install"]),
            EcosystemTag::CSharp => ("nuget", &["install"]),
            EcosystemTag::Java => ("mvn", &["dependency:get"]),
        };
        Self::with_command(program, args.iter().map(|s| s.to_string()).collect())
    }

    /// An adapter running an arbitrary installer command.
    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn package_arg(&self, package: &str) -> String {
        // Maven takes the package as a -D property rather than a positional
        if self.program == "mvn" {
            format!("-Dartifact={}", package)
        } else {
            package.to_string()
        }
    }
}

impl EcosystemAdapter for ToolchainAdapter {
    fn acquire(&self, name: &str, _version: &Version) -> Result<Acquisition, AdapterError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(self.package_arg(name))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| AdapterError::Spawn {
                tool: self.program.clone(),
                source: e,
            })?;

        if !status.success() {
            return Err(AdapterError::ToolchainFailed {
                tool: self.program.clone(),
                package: name.to_string(),
                exit_code: status.code(),
            });
        }

        Ok(Acquisition::Delegated)
    }
}

/// Dispatch table from ecosystem tag to adapter, with the generic registry
/// adapter as the fallback for native names and unregistered tags.
pub struct AdapterSet {
    fallback: Box<dyn EcosystemAdapter>,
    delegated: HashMap<EcosystemTag, Box<dyn EcosystemAdapter>>,
}

impl AdapterSet {
    /// A dispatch table with only the given fallback adapter.
    pub fn new(fallback: Box<dyn EcosystemAdapter>) -> Self {
        Self {
            fallback,
            delegated: HashMap::new(),
        }
    }

    /// The stock table: registry fallback plus one toolchain adapter per
    /// known ecosystem.
    pub fn with_defaults(client: RegistryClient) -> Self {
        let mut set = Self::new(Box::new(RegistryAdapter::new(client)));
        for tag in EcosystemTag::ALL {
            set.register(tag, Box::new(ToolchainAdapter::for_tag(tag)));
        }
        set
    }

    /// Register (or replace) the adapter for an ecosystem tag.
    pub fn register(&mut self, tag: EcosystemTag, adapter: Box<dyn EcosystemAdapter>) {
        self.delegated.insert(tag, adapter);
    }

    /// Whether acquiring `name` would take the delegated path.
    pub fn is_delegated(&self, name: &str) -> bool {
        matches!(classify(name), Some((tag, _)) if self.delegated.contains_key(&tag))
    }

    /// Acquire one dependency, dispatching on the name's ecosystem tag.
    ///
    /// Foreign names go to their registered adapter with the prefix
    /// stripped; native names and unregistered tags fall through to the
    /// generic registry path under the full name.
    pub fn acquire(&self, name: &str, version: &Version) -> Result<Acquisition, AdapterError> {
        if let Some((tag, bare)) = classify(name) {
            if let Some(adapter) = self.delegated.get(&tag) {
                return adapter.acquire(bare, version);
            }
        }
        self.fallback.acquire(name, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticAdapter(Vec<u8>);

    impl EcosystemAdapter for StaticAdapter {
        fn acquire(&self, _name: &str, _version: &Version) -> Result<Acquisition, AdapterError> {
            Ok(Acquisition::Payload(self.0.clone()))
        }
    }

    #[test]
    fn test_native_name_uses_fallback() {
        let set = AdapterSet::new(Box::new(StaticAdapter(b"payload".to_vec())));
        let result = set.acquire("http", &Version::new(1, 0, 0)).unwrap();
        assert!(matches!(result, Acquisition::Payload(ref b) if b == b"payload"));
    }

    #[test]
    fn test_unregistered_tag_falls_through() {
        // Foreign-looking name, but no adapter registered for its tag
        let set = AdapterSet::new(Box::new(StaticAdapter(b"payload".to_vec())));
        assert!(!set.is_delegated("python_requests"));
        let result = set
            .acquire("python_requests", &Version::new(1, 0, 0))
            .unwrap();
        assert!(matches!(result, Acquisition::Payload(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_toolchain_success_is_delegated() {
        let adapter = ToolchainAdapter::with_command("true", vec![]);
        let result = adapter.acquire("requests", &Version::new(1, 0, 0)).unwrap();
        assert!(matches!(result, Acquisition::Delegated));
    }

    #[cfg(unix)]
    #[test]
    fn test_toolchain_nonzero_exit_fails() {
        let adapter = ToolchainAdapter::with_command("false", vec![]);
        let err = adapter
            .acquire("requests", &Version::new(1, 0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::ToolchainFailed { ref package, .. } if package == "requests"
        ));
    }

    #[test]
    fn test_toolchain_missing_program_is_spawn_error() {
        let adapter = ToolchainAdapter::with_command("vesper-no-such-tool-xyz", vec![]);
        let err = adapter
            .acquire("requests", &Version::new(1, 0, 0))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Spawn { .. }));
    }

    #[test]
    fn test_registered_tag_strips_prefix() {
        struct NameCapture;
        impl EcosystemAdapter for NameCapture {
            fn acquire(&self, name: &str, _v: &Version) -> Result<Acquisition, AdapterError> {
                assert_eq!(name, "requests");
                Ok(Acquisition::Delegated)
            }
        }

        let mut set = AdapterSet::new(Box::new(StaticAdapter(vec![])));
        set.register(EcosystemTag::Python, Box::new(NameCapture));
        assert!(set.is_delegated("python_requests"));
        let result = set
            .acquire("python_requests", &Version::new(1, 0, 0))
            .unwrap();
        assert!(matches!(result, Acquisition::Delegated));
    }

    #[test]
    fn test_maven_package_arg() {
        let adapter = ToolchainAdapter::for_tag(EcosystemTag::Java);
        assert_eq!(adapter.package_arg("jython"), "-Dartifact=jython");

        let pip = ToolchainAdapter::for_tag(EcosystemTag::Python);
        assert_eq!(pip.package_arg("requests"), "requests");
    }
}
