//! Discovery and raw calls against a remote registry.

use std::sync::Arc;

use parking_lot::RwLock;
use protocol::{DescriptorSet, METADATA_API_NAME, METADATA_MEMBER, Reply, Request, Transport, Value};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::proxy::RemoteApis;
use crate::Result;

/// Calling side of a capstan connection.
///
/// Wraps a [`Transport`]. Calls can be sent raw, or through the proxies
/// built by [`refresh`](Self::refresh) from the remote self-description.
pub struct Client {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    apis: RwLock<Arc<RemoteApis>>,
}

impl Client {
    /// Create a client. No proxies exist until the first refresh.
    pub fn new(transport: impl Transport + 'static, config: ClientConfig) -> Self {
        Self::from_shared(Arc::new(transport), config)
    }

    /// Create a client over a transport that is shared with other owners.
    pub fn from_shared(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            apis: RwLock::new(Arc::new(RemoteApis::default())),
        }
    }

    /// Create a client and run the first refresh.
    pub async fn connect(transport: impl Transport + 'static, config: ClientConfig) -> Result<Self> {
        let client = Self::new(transport, config);
        client.refresh().await?;
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a call to `api_name.member_name` without going through a proxy.
    pub fn send_method_call(
        &self,
        api_name: &str,
        version: &str,
        member_name: &str,
        args: Vec<Value>,
        reply: Reply,
    ) {
        debug!("send_method_call() {api_name}@{version}.{member_name}");
        let request = Request::new(api_name)
            .with_version(version)
            .with_member(member_name)
            .with_args(args);
        self.transport.send(request, reply);
    }

    /// Send a call to a function or constant without going through a proxy.
    pub fn send_call(&self, api_name: &str, version: &str, args: Vec<Value>, reply: Reply) {
        debug!("send_call() {api_name}@{version}");
        let request = Request::new(api_name).with_version(version).with_args(args);
        self.transport.send(request, reply);
    }

    /// Awaitable form of [`send_method_call`](Self::send_method_call).
    pub async fn call_method(
        &self,
        api_name: &str,
        version: &str,
        member_name: &str,
        args: Vec<Value>,
    ) -> Result<Vec<Value>> {
        let (reply, pending) = Reply::channel();
        self.send_method_call(api_name, version, member_name, args, reply);
        Ok(pending.await.into_result()?)
    }

    /// Awaitable form of [`send_call`](Self::send_call).
    pub async fn call(&self, api_name: &str, version: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        let (reply, pending) = Reply::channel();
        self.send_call(api_name, version, args, reply);
        Ok(pending.await.into_result()?)
    }

    /// Ask the remote what it exposes and rebuild every proxy.
    ///
    /// Discovery carries no version, so it reaches the self-description at
    /// the remote's default version whatever the configured range is. The
    /// previous proxy set is replaced wholesale; handles taken from it keep
    /// working but are not updated.
    pub async fn refresh(&self) -> Result<Arc<RemoteApis>> {
        debug!("refresh()");

        let (reply, pending) = Reply::channel();
        self.transport
            .send(Request::new(METADATA_API_NAME).with_member(METADATA_MEMBER), reply);
        let values = pending.await.into_result()?;
        let document = values.into_iter().next().unwrap_or(Value::Null);
        let descriptors: DescriptorSet = serde_json::from_value(document)?;

        let apis = Arc::new(RemoteApis::build(
            &descriptors,
            self.transport.clone(),
            &self.config.version_range,
        ));
        info!("discovered {} remote apis", apis.len());

        *self.apis.write() = apis.clone();
        Ok(apis)
    }

    /// Proxies from the latest refresh.
    pub fn apis(&self) -> Arc<RemoteApis> {
        self.apis.read().clone()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("apis", &self.apis.read().names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use parking_lot::Mutex;
    use protocol::{ErrorCode, RemoteError, transport_fn};
    use serde_json::json;

    /// Answers discovery with a fixed document and every other call with "bar".
    fn mock(sent: Arc<Mutex<Vec<Request>>>) -> impl Transport {
        transport_fn(move |request: Request, reply: Reply| {
            if request.api_name == METADATA_API_NAME {
                return reply.ok(json!({
                    "foo": { "kind": "Module", "name": "foo", "version": "1.0.0", "memberNames": ["bar"] },
                    "boo": { "kind": "Constant", "name": "boo", "version": "1.0.0" }
                }));
            }
            sent.lock().push(request);
            reply.ok(json!("bar"));
        })
    }

    #[tokio::test]
    async fn send_method_call_with_arguments() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let client = Client::new(mock(sent.clone()), ClientConfig::default());

        let values = client
            .call_method("test", "*", "foo", vec![json!(1)])
            .await
            .unwrap();
        assert_eq!(values, vec![json!("bar")]);

        let request = sent.lock().pop().unwrap();
        assert_eq!(request.member_name.as_deref(), Some("foo"));
        assert_eq!(request.version.as_deref(), Some("*"));
        assert_eq!(request.args, vec![json!(1)]);
    }

    #[tokio::test]
    async fn send_call_without_member() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let client = Client::new(mock(sent.clone()), ClientConfig::default());

        let values = client.call("test", "*", Vec::new()).await.unwrap();
        assert_eq!(values, vec![json!("bar")]);
        assert_eq!(sent.lock().pop().unwrap().member_name, None);
    }

    #[tokio::test]
    async fn refresh_mounts_proxies() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let client = Client::new(mock(sent.clone()), ClientConfig::default());
        assert!(client.apis().is_empty());

        let apis = client.refresh().await.unwrap();
        assert!(Arc::ptr_eq(&apis, &client.apis()));
        assert!(apis.callable("boo").is_ok());

        let result = apis.method("foo", "bar").unwrap().call_value(Vec::new()).await;
        assert_eq!(result.unwrap(), json!("bar"));
    }

    #[tokio::test]
    async fn discovery_ignores_configured_range() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = sent.clone();
        let transport = transport_fn(move |request: Request, reply: Reply| {
            log.lock().push(request);
            reply.ok(json!({}));
        });
        let config = ClientConfig {
            version_range: "^2.0.0".to_string(),
        };
        let client = Client::new(transport, config);

        client.refresh().await.unwrap();

        let request = sent.lock().pop().unwrap();
        assert_eq!(request.api_name, METADATA_API_NAME);
        assert_eq!(request.member_name.as_deref(), Some(METADATA_MEMBER));
        assert_eq!(request.version, None);
    }

    #[tokio::test]
    async fn refresh_propagates_remote_error() {
        let transport = transport_fn(|_request: Request, reply: Reply| {
            reply.err(RemoteError::transport("offline"));
        });
        let client = Client::new(transport, ClientConfig::default());

        match client.refresh().await {
            Err(Error::Remote(e)) => assert_eq!(e.code, ErrorCode::Transport),
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_rejects_malformed_document() {
        let transport = transport_fn(|_request: Request, reply: Reply| {
            reply.ok(json!(["not", "a", "map"]));
        });
        let client = Client::new(transport, ClientConfig::default());
        assert!(matches!(
            client.refresh().await,
            Err(Error::InvalidDescriptors(_))
        ));
    }
}
