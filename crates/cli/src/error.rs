//! CLI error types.

use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The config file could not be parsed.
    #[error("failed to parse config: {0}")]
    Config(String),

    /// The package version could not be used as the registry default.
    #[error("invalid default version: {0}")]
    DefaultVersion(#[from] semver::Error),

    /// A reply value could not be rendered as JSON.
    #[error("failed to render reply: {0}")]
    Json(#[from] serde_json::Error),

    /// An error occurred while building the registry.
    #[error(transparent)]
    Registry(#[from] registry::Error),

    /// An error occurred on the calling side.
    #[error(transparent)]
    Client(#[from] client::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
