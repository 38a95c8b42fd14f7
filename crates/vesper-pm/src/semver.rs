//! Semantic version parsing and constraint matching
//!
//! Vesper constraints come in two shapes: caret ranges (`^1.2.0`) and exact
//! versions (`1.2.0` or `=1.2.0`). A caret range accepts any version with the
//! same major component that orders at or above the base version.

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while parsing versions or constraints
#[derive(Debug, Error)]
pub enum SemverError {
    /// Invalid version format
    #[error("invalid version '{0}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion(String),

    /// Invalid constraint format
    #[error("invalid constraint '{0}'")]
    InvalidConstraint(String),
}

/// Semantic version (MAJOR.MINOR.PATCH with optional pre-release/build tags)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
}

impl Version {
    /// Parse a version string such as `1.2.3`, `v1.2.3` or `1.2.3-rc.1+abc`.
    pub fn parse(s: &str) -> Result<Self, SemverError> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);

        // Split off build metadata, then the pre-release tag
        let (version_part, build) = match s.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (s, None),
        };
        let (core, prerelease) = match version_part.split_once('-') {
            Some((v, p)) => (v, Some(p.to_string())),
            None => (version_part, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(SemverError::InvalidVersion(s.to_string()));
        }

        let component = |raw: &str| {
            raw.parse::<u64>()
                .map_err(|_| SemverError::InvalidVersion(s.to_string()))
        };

        Ok(Version {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
            prerelease,
            build,
        })
    }

    /// Create a release version with no pre-release or build tags.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Check if this is a pre-release version.
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.minor.cmp(&other.minor) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.patch.cmp(&other.patch) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // A pre-release orders below the corresponding release. Build
        // metadata never participates in ordering.
        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

/// Version constraint owned by a single manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Exact version (`1.2.3` or `=1.2.3`)
    Exact(Version),

    /// Caret range (`^1.2.3`): same major, at or above the base version
    Caret(Version),
}

impl Constraint {
    /// Parse a constraint expression.
    pub fn parse(s: &str) -> Result<Self, SemverError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SemverError::InvalidConstraint(s.to_string()));
        }

        if let Some(rest) = s.strip_prefix('^') {
            let version = Version::parse(rest)
                .map_err(|_| SemverError::InvalidConstraint(s.to_string()))?;
            return Ok(Constraint::Caret(version));
        }

        if let Some(rest) = s.strip_prefix('=') {
            let version = Version::parse(rest)
                .map_err(|_| SemverError::InvalidConstraint(s.to_string()))?;
            return Ok(Constraint::Exact(version));
        }

        let version =
            Version::parse(s).map_err(|_| SemverError::InvalidConstraint(s.to_string()))?;
        Ok(Constraint::Exact(version))
    }

    /// Check if a version satisfies this constraint.
    ///
    /// Caret ranges require an equal major component and a version ordering
    /// at or above the base, for `0.x` bases as well.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Constraint::Exact(v) => {
                version.major == v.major
                    && version.minor == v.minor
                    && version.patch == v.patch
                    && version.prerelease == v.prerelease
            }
            Constraint::Caret(v) => version.major == v.major && version >= v,
        }
    }

    /// Whether this constraint already accepts `latest`, i.e. an update pass
    /// has nothing to do for the owning entry.
    pub fn is_up_to_date(&self, latest: &Version) -> bool {
        self.matches(latest)
    }

    /// The version literal inside the constraint. Used as the resolution
    /// fallback when no newer acceptable version is known.
    pub fn base_version(&self) -> &Version {
        match self {
            Constraint::Exact(v) | Constraint::Caret(v) => v,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Exact(v) => write!(f, "{}", v),
            Constraint::Caret(v) => write!(f, "^{}", v),
        }
    }
}
