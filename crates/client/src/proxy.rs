//! Callable stand-ins for remote capabilities.

use std::collections::BTreeMap;
use std::sync::Arc;

use protocol::{Descriptor, DescriptorSet, METADATA_API_NAME, Reply, Request, Transport, Value};
use tracing::debug;

use crate::{Error, Result};

/// One positional argument to [`RemoteMethod::apply`].
#[derive(Debug)]
pub enum Argument {
    Value(Value),
    Reply(Reply),
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Value(value)
    }
}

impl From<Reply> for Argument {
    fn from(reply: Reply) -> Self {
        Argument::Reply(reply)
    }
}

/// A remote function, constant, or single module member.
///
/// Closes over a fixed api/member pair, so a handle keeps working after the
/// proxy set it came from has been replaced, as long as the remote side
/// still exposes it.
#[derive(Clone)]
pub struct RemoteMethod {
    transport: Arc<dyn Transport>,
    api_name: String,
    member_name: Option<String>,
    version_range: String,
}

impl RemoteMethod {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        api_name: impl Into<String>,
        member_name: Option<String>,
        version_range: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            api_name: api_name.into(),
            member_name,
            version_range: version_range.into(),
        }
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    fn request(&self, args: Vec<Value>) -> Request {
        Request {
            api_name: self.api_name.clone(),
            member_name: self.member_name.clone(),
            version: Some(self.version_range.clone()),
            args,
        }
    }

    /// Send a call; the remote answer is routed to `reply` unchanged.
    pub fn invoke(&self, args: Vec<Value>, reply: Reply) {
        debug!(
            api = %self.api_name,
            member = ?self.member_name,
            args = args.len(),
            "sending call"
        );
        self.transport.send(self.request(args), reply);
    }

    /// Send a call and wait for every value of the reply.
    pub async fn call(&self, args: Vec<Value>) -> Result<Vec<Value>> {
        let (reply, pending) = Reply::channel();
        self.invoke(args, reply);
        Ok(pending.await.into_result()?)
    }

    /// Send a call and wait for the first value of the reply.
    pub async fn call_value(&self, args: Vec<Value>) -> Result<Value> {
        let (reply, pending) = Reply::channel();
        self.invoke(args, reply);
        Ok(pending.await.into_value()?)
    }

    /// Call with a dynamic argument list whose last element is the reply.
    ///
    /// Fails before anything reaches the transport if the list does not end
    /// with a reply, or carries a reply anywhere else.
    pub fn apply(&self, mut args: Vec<Argument>) -> Result<()> {
        let Some(Argument::Reply(reply)) = args.pop() else {
            return Err(Error::MissingCallback);
        };

        let values = args
            .into_iter()
            .enumerate()
            .map(|(position, arg)| match arg {
                Argument::Value(value) => Ok(value),
                Argument::Reply(_) => Err(Error::MisplacedCallback(position)),
            })
            .collect::<Result<Vec<_>>>()?;

        self.invoke(values, reply);
        Ok(())
    }
}

impl std::fmt::Debug for RemoteMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteMethod")
            .field("api_name", &self.api_name)
            .field("member_name", &self.member_name)
            .field("version_range", &self.version_range)
            .finish_non_exhaustive()
    }
}

/// A remote module: one [`RemoteMethod`] per exposed member.
#[derive(Debug, Clone)]
pub struct RemoteModule {
    name: String,
    members: BTreeMap<String, RemoteMethod>,
}

impl RemoteModule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self, name: &str) -> Option<&RemoteMethod> {
        self.members.get(name)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

/// Proxy for one remote capability.
#[derive(Debug, Clone)]
pub enum RemoteApi {
    Module(RemoteModule),
    /// Functions and constants; called without a member name.
    Callable(RemoteMethod),
}

impl RemoteApi {
    pub fn as_module(&self) -> Option<&RemoteModule> {
        match self {
            RemoteApi::Module(module) => Some(module),
            RemoteApi::Callable(_) => None,
        }
    }

    pub fn as_callable(&self) -> Option<&RemoteMethod> {
        match self {
            RemoteApi::Callable(method) => Some(method),
            RemoteApi::Module(_) => None,
        }
    }
}

/// Every proxy built from one discovery pass.
#[derive(Debug, Clone, Default)]
pub struct RemoteApis {
    apis: BTreeMap<String, RemoteApi>,
    descriptors: DescriptorSet,
}

impl RemoteApis {
    /// Build one proxy per descriptor, skipping the self-description entry.
    pub fn build(
        descriptors: &DescriptorSet,
        transport: Arc<dyn Transport>,
        version_range: &str,
    ) -> Self {
        let descriptors: DescriptorSet = descriptors
            .iter()
            .filter(|(name, _)| name.as_str() != METADATA_API_NAME)
            .map(|(name, descriptor)| (name.clone(), descriptor.clone()))
            .collect();

        let apis = descriptors
            .iter()
            .map(|(name, descriptor)| {
                let api = if descriptor.is_module() {
                    let members = descriptor
                        .member_names
                        .iter()
                        .flatten()
                        .map(|member| {
                            let method = RemoteMethod::new(
                                transport.clone(),
                                name.clone(),
                                Some(member.clone()),
                                version_range,
                            );
                            (member.clone(), method)
                        })
                        .collect();
                    debug!("api '{name}' is a module");
                    RemoteApi::Module(RemoteModule {
                        name: name.clone(),
                        members,
                    })
                } else {
                    debug!("api '{name}' is a {}", descriptor.kind);
                    RemoteApi::Callable(RemoteMethod::new(
                        transport.clone(),
                        name.clone(),
                        None,
                        version_range,
                    ))
                };
                (name.clone(), api)
            })
            .collect();

        Self { apis, descriptors }
    }

    pub fn get(&self, name: &str) -> Option<&RemoteApi> {
        self.apis.get(name)
    }

    /// The descriptor the proxy for `name` was built from.
    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.get(name)
    }

    /// Every descriptor behind this proxy set, by name.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.values()
    }

    /// The proxy for a function or constant.
    pub fn callable(&self, name: &str) -> Result<&RemoteMethod> {
        match self.get(name) {
            Some(RemoteApi::Callable(method)) => Ok(method),
            Some(RemoteApi::Module(_)) => Err(Error::NotCallable(name.to_string())),
            None => Err(Error::UnknownApi(name.to_string())),
        }
    }

    /// The proxy for `api.member`.
    pub fn method(&self, api: &str, member: &str) -> Result<&RemoteMethod> {
        let module = self
            .get(api)
            .ok_or_else(|| Error::UnknownApi(api.to_string()))?;

        module
            .as_module()
            .and_then(|module| module.member(member))
            .ok_or_else(|| Error::UnknownMember {
                api: api.to_string(),
                member: member.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.apis.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }
}
