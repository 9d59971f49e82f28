//! Registry configuration loaded from TOML.

use std::path::Path;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::exclusion::ExclusionOptions;
use crate::{Error, Result};

/// Registry configuration.
///
/// ```toml
/// default_version = "1.4.0"
///
/// [exclusions]
/// exclude_prefix = ["_", "$"]
/// exclude_pattern = ["Sync$"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Version that requests without a version resolve to, and the version
    /// the self-description capability is registered at.
    pub default_version: Version,

    /// Exclusions for modules added without their own.
    #[serde(default)]
    pub exclusions: ExclusionOptions,
}

impl RegistryConfig {
    pub fn new(default_version: Version) -> Self {
        Self {
            default_version,
            exclusions: ExclusionOptions::default(),
        }
    }

    /// Load config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse config from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }
}
