//! Client configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Version range sent with every call and with discovery.
    #[serde(default = "default_version_range")]
    pub version_range: String,
}

fn default_version_range() -> String {
    "*".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version_range: default_version_range(),
        }
    }
}

impl ClientConfig {
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
