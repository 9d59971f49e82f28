//! Plain-data types shared by both ends of a capstan connection.
//!
//! Nothing in here knows how bytes move. A [`Request`] goes out through a
//! [`Transport`], the remote side answers exactly once through the
//! [`Reply`] it was handed, and the answer comes back as a
//! [`ReplyEnvelope`]. The transport decides how (or whether) any of it is
//! serialized.
//!
//! # Example
//!
//! ```
//! use protocol::{Reply, Request, Transport, transport_fn};
//! use serde_json::json;
//!
//! # async fn example() {
//! // A loopback transport that echoes the arguments back.
//! let transport = transport_fn(|request: Request, reply: Reply| {
//!     reply.ok_many(request.args);
//! });
//!
//! let (reply, pending) = Reply::channel();
//! transport.send(Request::new("echo").with_args([json!(1), json!(2)]), reply);
//!
//! let values = pending.await.into_result().unwrap();
//! assert_eq!(values, vec![json!(1), json!(2)]);
//! # }
//! ```

mod descriptor;
mod envelope;
mod reply;
mod transport;

pub use descriptor::{CapabilityKind, Descriptor, DescriptorSet, METADATA_API_NAME, METADATA_MEMBER};
pub use envelope::{ErrorCode, RemoteError, ReplyEnvelope, Request};
pub use reply::{PendingReply, Reply};
pub use transport::{FnTransport, Transport, transport_fn};

/// Structured value carried in arguments and replies.
pub use serde_json::Value;
