//! The calling side of capstan.
//!
//! A [`Client`] sends requests through any [`protocol::Transport`]. After a
//! [`Client::refresh`] it also holds a [`RemoteApis`] set: one proxy per
//! capability the remote registry reported, built from the remote's
//! self-description with no shared schema.
//!
//! # Example
//!
//! ```no_run
//! use client::{Client, ClientConfig};
//! use protocol::{Reply, Request, transport_fn};
//! use serde_json::json;
//!
//! # async fn example() -> client::Result<()> {
//! // Any send/reply channel works; this one would forward to a socket.
//! let transport = transport_fn(|request: Request, reply: Reply| {
//!     let _ = (request, reply);
//! });
//!
//! let client = Client::connect(transport, ClientConfig::default()).await?;
//! let apis = client.apis();
//!
//! let contents = apis
//!     .method("fs", "readFile")?
//!     .call_value(vec![json!("README.md")])
//!     .await?;
//! println!("{contents}");
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod proxy;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use proxy::{Argument, RemoteApi, RemoteApis, RemoteMethod, RemoteModule};
