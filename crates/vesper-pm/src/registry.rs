//! Registry HTTP client
//!
//! Blocking client for the Vesper module registry. The registry serves one
//! endpoint: `GET {base}/{name}/{version}` whose response body is the raw
//! module artifact.

use std::time::Duration;
use thiserror::Error;

use crate::semver::Version;

/// Default registry URL
pub const DEFAULT_REGISTRY: &str = "https://pkg.vesper.dev/modules";

/// Errors that can occur during registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Module version not published
    #[error("module not found in registry: {name}@{version}")]
    NotFound { name: String, version: String },

    /// Registry answered with a non-success status
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Client for the module registry
pub struct RegistryClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client against the default registry.
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_url(DEFAULT_REGISTRY)
    }

    /// Create a client against a custom registry URL.
    pub fn with_url(base_url: &str) -> Result<Self, RegistryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("vesper-pm/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the artifact payload for `name` at `version`.
    ///
    /// GET {base}/{name}/{version}
    pub fn fetch_module(&self, name: &str, version: &Version) -> Result<Vec<u8>, RegistryError> {
        let url = self.endpoint(name, version);
        let response = self.client.get(&url).send()?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
                version: version.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "registry returned status {}",
                response.status()
            )));
        }

        Ok(response.bytes()?.to_vec())
    }

    fn endpoint(&self, name: &str, version: &Version) -> String {
        format!("{}/{}/{}", self.base_url, name, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_layout() {
        let client = RegistryClient::with_url("https://example.test/modules/").unwrap();
        assert_eq!(
            client.endpoint("http", &Version::new(1, 2, 3)),
            "https://example.test/modules/http/1.2.3"
        );
    }

    #[test]
    fn test_default_registry_url() {
        assert_eq!(DEFAULT_REGISTRY, "https://pkg.vesper.dev/modules");
    }
}
