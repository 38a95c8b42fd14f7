//! Ecosystem classification of dependency names
//!
//! A dependency name carrying a reserved prefix (`python_requests`,
//! `js_axios`, ...) belongs to a foreign ecosystem: its acquisition is
//! delegated to that ecosystem's own installer. Unprefixed names are
//! native modules served by the generic registry.

use std::fmt;

/// The fixed set of foreign ecosystems with delegated installers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcosystemTag {
    Python,
    Ruby,
    Rust,
    CSharp,
    Js,
    Java,
}

impl EcosystemTag {
    /// All known tags, in prefix-matching order.
    pub const ALL: [EcosystemTag; 6] = [
        EcosystemTag::Python,
        EcosystemTag::Ruby,
        EcosystemTag::Rust,
        EcosystemTag::CSharp,
        EcosystemTag::Js,
        EcosystemTag::Java,
    ];

    /// The reserved name prefix marking a dependency as belonging to this
    /// ecosystem.
    pub fn prefix(&self) -> &'static str {
        match self {
            EcosystemTag::Python => "python_",
            EcosystemTag::Ruby => "ruby_",
            EcosystemTag::Rust => "rust_",
            EcosystemTag::CSharp => "csharp_",
            EcosystemTag::Js => "js_",
            EcosystemTag::Java => "java_",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EcosystemTag::Python => "python",
            EcosystemTag::Ruby => "ruby",
            EcosystemTag::Rust => "rust",
            EcosystemTag::CSharp => "csharp",
            EcosystemTag::Js => "js",
            EcosystemTag::Java => "java",
        }
    }
}

impl fmt::Display for EcosystemTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a dependency name.
///
/// Returns the ecosystem tag and the bare package name with the prefix
/// stripped, or `None` for native names.
pub fn classify(name: &str) -> Option<(EcosystemTag, &str)> {
    for tag in EcosystemTag::ALL {
        if let Some(bare) = name.strip_prefix(tag.prefix()) {
            if !bare.is_empty() {
                return Some((tag, bare));
            }
        }
    }
    None
}
