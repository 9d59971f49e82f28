//! The exposing side of capstan: a versioned registry of capabilities and
//! the dispatcher that serves requests against it.
//!
//! # Overview
//!
//! - **Capability**: a function, a module (named members over shared state)
//!   or a constant, registered under a name and an exact semantic version.
//! - **Registry**: stores every version of every capability and resolves a
//!   version range to the highest stored version that satisfies it.
//! - **Dispatch**: validates a [`protocol::Request`], resolves it, and invokes
//!   the capability. Every failure is answered through the reply.
//! - **Self-description**: a module registered under
//!   [`protocol::METADATA_API_NAME`] whose `getApis` member reports the
//!   descriptor of the newest version of each capability.
//!
//! # Example
//!
//! ```
//! use protocol::{Reply, Request, Value};
//! use registry::{MethodTable, Registry};
//! use semver::Version;
//! use serde_json::json;
//!
//! let registry = Registry::new(Version::new(1, 0, 0));
//!
//! registry.add_constant("answer", "1.0.0", json!(42))?;
//! registry.add_function("sum", "1.0.0", |args: Vec<Value>, reply: Reply| {
//!     reply.ok(json!(args.iter().filter_map(Value::as_i64).sum::<i64>()));
//! })?;
//! registry.add_module(
//!     "text",
//!     "1.2.0",
//!     MethodTable::stateless().method("upper", |_: &(), args: Vec<Value>, reply: Reply| {
//!         let text = args.first().and_then(Value::as_str).unwrap_or_default();
//!         reply.ok(json!(text.to_uppercase()));
//!     }),
//!     None,
//! )?;
//!
//! let (reply, mut pending) = Reply::channel();
//! registry.dispatch(
//!     Request::new("text")
//!         .with_member("upper")
//!         .with_version("^1.0.0")
//!         .with_args([json!("hi")]),
//!     reply,
//! );
//! assert_eq!(pending.try_recv().unwrap().into_value().unwrap(), json!("HI"));
//! # Ok::<(), registry::Error>(())
//! ```

mod capability;
mod config;
mod dispatch;
mod error;
mod exclusion;
mod metadata;
mod module;
mod range;
mod registry;

pub use capability::{Artifact, Capability, FunctionArtifact};
pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use exclusion::ExclusionOptions;
pub use module::{MethodTable, Module, Unsupported};
pub use registry::Registry;
