//! Client error types.

use protocol::RemoteError;
use thiserror::Error;

/// Client errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A proxy was applied without a trailing reply argument.
    #[error("missing callback argument")]
    MissingCallback,

    /// A reply argument appeared somewhere other than last.
    #[error("callback must be the last argument (found one at position {0})")]
    MisplacedCallback(usize),

    /// The remote side (or the transport) answered with an error.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The self-description reply could not be read as descriptors.
    #[error("invalid descriptor document: {0}")]
    InvalidDescriptors(#[from] serde_json::Error),

    /// The last refresh reported no api by that name.
    #[error("remote does not expose {0} api")]
    UnknownApi(String),

    /// The api exists but is not a module with that member.
    #[error("remote api {api} has no member {member}")]
    UnknownMember { api: String, member: String },

    /// The api is a module; only its members can be called.
    #[error("remote api {0} is a module, call one of its members")]
    NotCallable(String),

    /// Failed to parse a client config file.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// An I/O error occurred while reading config.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
