//! Registry error types.

use protocol::{ErrorCode, RemoteError};
use thiserror::Error;

/// Registry errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A capability name was empty or blank.
    #[error("capability name must be a non-empty string")]
    InvalidName,

    /// A registered version is not a valid semantic version.
    #[error("invalid version \"{version}\": {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    /// A requested version range could not be parsed.
    #[error("invalid version range \"{range}\": {source}")]
    InvalidRange {
        range: String,
        #[source]
        source: semver::Error,
    },

    /// A member exclusion pattern is not a valid regular expression.
    #[error("invalid exclusion pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Nothing is registered under the name.
    #[error("remote does not expose {0} api")]
    UnknownCapability(String),

    /// The name is registered but none of its versions satisfy the range.
    #[error("could not find a version of {name} that satisfies {range}")]
    NoMatchingVersion { name: String, range: String },

    /// Failed to parse a registry config file.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// An I/O error occurred while reading config.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The form of this error that is sent back through a reply.
    pub fn to_remote(&self) -> RemoteError {
        let code = match self {
            Error::UnknownCapability(_) => ErrorCode::UnknownCapability,
            Error::NoMatchingVersion { .. } => ErrorCode::NoMatchingVersion,
            _ => ErrorCode::InvalidRequest,
        };
        RemoteError::new(code, self.to_string())
    }
}

impl From<Error> for RemoteError {
    fn from(error: Error) -> Self {
        error.to_remote()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
