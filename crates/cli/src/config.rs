//! Configuration loading from capstan.toml.

use std::path::Path;

use client::ClientConfig;
use registry::{ExclusionOptions, RegistryConfig};
use semver::Version;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
///
/// ```toml
/// default_version = "1.0.0"
///
/// [exclusions]
/// exclude_pattern = ["Sync$"]
///
/// [client]
/// version_range = "^1"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Registry default version. Falls back to the binary's own version.
    pub default_version: Option<Version>,

    /// Exclusions for modules added without their own.
    #[serde(default)]
    pub exclusions: ExclusionOptions,

    /// Settings for the in-process client.
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Config(e.to_string()))
    }

    /// The registry half of this configuration.
    pub fn registry(&self) -> Result<RegistryConfig> {
        let default_version = match &self.default_version {
            Some(version) => version.clone(),
            None => Version::parse(env!("CARGO_PKG_VERSION"))?,
        };
        Ok(RegistryConfig {
            default_version,
            exclusions: self.exclusions.clone(),
        })
    }
}
