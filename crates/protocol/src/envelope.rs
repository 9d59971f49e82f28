//! Request and reply envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A call addressed to one capability on the remote side.
///
/// `version` is a range expression, not a concrete version. When it is
/// absent the remote registry falls back to its own default version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default)]
    pub api_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(api_name: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            ..Default::default()
        }
    }

    pub fn with_member(mut self, member_name: impl Into<String>) -> Self {
        self.member_name = Some(member_name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = args.into_iter().collect();
        self
    }
}

/// The single answer to a [`Request`].
///
/// Mirrors the `(error, value, ...extra)` reply convention: when `error` is
/// set the values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl ReplyEnvelope {
    pub fn ok(value: Value) -> Self {
        Self {
            error: None,
            values: vec![value],
        }
    }

    pub fn ok_many(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            error: None,
            values: values.into_iter().collect(),
        }
    }

    pub fn err(error: RemoteError) -> Self {
        Self {
            error: Some(error),
            values: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns every positional value, or the error.
    pub fn into_result(self) -> Result<Vec<Value>, RemoteError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.values),
        }
    }

    /// Returns the first value (`null` when the reply carried none), or the error.
    pub fn into_value(self) -> Result<Value, RemoteError> {
        self.into_result()
            .map(|values| values.into_iter().next().unwrap_or(Value::Null))
    }
}

/// Classification of a [`RemoteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request itself is malformed (missing or blank name, bad member name).
    InvalidRequest,
    /// Nothing is registered under the requested name.
    UnknownCapability,
    /// The name exists but no stored version satisfies the requested range.
    NoMatchingVersion,
    /// A module capability was called without a member name.
    MissingMember,
    /// The module has no invokable member by that name.
    Unsupported,
    /// Raised by the capability itself; passed through untouched.
    Capability,
    /// The transport could not deliver the request or the reply.
    Transport,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::UnknownCapability => "unknown_capability",
            ErrorCode::NoMatchingVersion => "no_matching_version",
            ErrorCode::MissingMember => "missing_member",
            ErrorCode::Unsupported => "unsupported",
            ErrorCode::Capability => "capability",
            ErrorCode::Transport => "transport",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error that travels back to the caller inside a [`ReplyEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RemoteError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unsupported, message)
    }

    /// An error produced by capability code.
    pub fn capability(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Capability, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transport, message)
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.code;
        let message = &self.message;
        write!(f, "[{code}] {message}")
    }
}

impl std::error::Error for RemoteError {}
