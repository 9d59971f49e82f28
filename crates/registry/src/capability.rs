//! Capabilities: the units a registry exposes.

use std::sync::Arc;

use protocol::{CapabilityKind, Descriptor, ErrorCode, RemoteError, Reply, Request, Value};
use semver::Version;

use crate::exclusion::ExclusionOptions;
use crate::module::{Module, Unsupported};
use crate::{Error, Result};

/// A plain function. Receives the request arguments and the reply.
pub type FunctionArtifact = Arc<dyn Fn(Vec<Value>, Reply) + Send + Sync>;

/// What a capability wraps. The variant is fixed when the capability is built.
#[derive(Clone)]
pub enum Artifact {
    Function(FunctionArtifact),
    Module(Arc<dyn Module>),
    Constant(Value),
}

impl Artifact {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Artifact::Function(_) => CapabilityKind::Function,
            Artifact::Module(_) => CapabilityKind::Module,
            Artifact::Constant(_) => CapabilityKind::Constant,
        }
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Artifact::Function(_) => f.write_str("Function(..)"),
            Artifact::Module(_) => f.write_str("Module(..)"),
            Artifact::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
        }
    }
}

/// One named, versioned unit of remotely callable behavior.
#[derive(Debug, Clone)]
pub struct Capability {
    pub(crate) name: String,
    pub(crate) version: Version,
    pub(crate) artifact: Artifact,
    /// Filtered member list; empty unless the artifact is a module.
    pub(crate) member_names: Vec<String>,
}

impl Capability {
    pub fn function<F>(name: impl Into<String>, version: &str, function: F) -> Result<Self>
    where
        F: Fn(Vec<Value>, Reply) + Send + Sync + 'static,
    {
        Self::build(name.into(), version, Artifact::Function(Arc::new(function)), Vec::new())
    }

    /// Build a module capability. The exposed members are computed here, once.
    pub fn module(
        name: impl Into<String>,
        version: &str,
        module: Arc<dyn Module>,
        exclusions: &ExclusionOptions,
    ) -> Result<Self> {
        let member_names = exclusions.filter(module.members())?;
        Self::build(name.into(), version, Artifact::Module(module), member_names)
    }

    pub fn constant(name: impl Into<String>, version: &str, value: Value) -> Result<Self> {
        Self::build(name.into(), version, Artifact::Constant(value), Vec::new())
    }

    fn build(
        name: String,
        version: &str,
        artifact: Artifact,
        member_names: Vec<String>,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::InvalidName);
        }

        Ok(Self {
            name,
            version: parse_version(version)?,
            artifact,
            member_names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn kind(&self) -> CapabilityKind {
        self.artifact.kind()
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn member_names(&self) -> &[String] {
        &self.member_names
    }

    /// Regenerated on every call.
    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            kind: self.kind(),
            name: self.name.clone(),
            version: self.version.to_string(),
            member_names: match self.artifact {
                Artifact::Module(_) => Some(self.member_names.clone()),
                _ => None,
            },
        }
    }

    /// Invoke the artifact for `request`. Always answers through `reply`,
    /// except that functions and module members answer on their own schedule.
    pub fn dispatch(&self, request: Request, reply: Reply) {
        match &self.artifact {
            Artifact::Function(function) => function(request.args, reply),
            Artifact::Module(module) => {
                let Some(member) = request.member_name.as_deref() else {
                    return reply.err(RemoteError::new(
                        ErrorCode::MissingMember,
                        "missing member name",
                    ));
                };

                if member.trim().is_empty() {
                    return reply.err(RemoteError::new(
                        ErrorCode::MissingMember,
                        "empty member name",
                    ));
                }

                if !self.member_names.iter().any(|m| m == member) {
                    return reply.err(unsupported(member));
                }

                if let Err(Unsupported(reply)) = module.call(member, request.args, reply) {
                    reply.err(unsupported(member));
                }
            }
            Artifact::Constant(value) => reply.ok(value.clone()),
        }
    }
}

fn unsupported(member: &str) -> RemoteError {
    RemoteError::unsupported(format!("{member} is unsupported in this api"))
}

/// Parse a concrete version, tolerating a leading `v` or `=` and whitespace.
pub(crate) fn parse_version(raw: &str) -> Result<Version> {
    let cleaned = raw.trim();
    let cleaned = cleaned
        .strip_prefix('=')
        .unwrap_or(cleaned)
        .trim_start();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);

    Version::parse(cleaned).map_err(|source| Error::InvalidVersion {
        version: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::MethodTable;
    use serde_json::json;

    fn echo() -> Capability {
        Capability::function("echo", "1.0.0", |args: Vec<Value>, reply: Reply| {
            reply.ok_many(args)
        })
        .unwrap()
    }

    fn math() -> Arc<dyn Module> {
        Arc::new(
            MethodTable::stateless()
                .method("add", |_: &(), args: Vec<Value>, reply: Reply| {
                    let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
                    reply.ok(json!(sum));
                })
                .method("_secret", |_: &(), _, reply: Reply| reply.ok(json!("hidden"))),
        )
    }

    #[test]
    fn rejects_blank_name() {
        let result = Capability::constant("  ", "1.0.0", json!(1));
        assert!(matches!(result, Err(Error::InvalidName)));
    }

    #[test]
    fn rejects_invalid_version() {
        let result = Capability::constant("answer", "1.0", json!(42));
        assert!(matches!(result, Err(Error::InvalidVersion { .. })));

        let result = Capability::constant("answer", "", json!(42));
        assert!(matches!(result, Err(Error::InvalidVersion { .. })));
    }

    #[test]
    fn cleans_version_prefixes() {
        let capability = Capability::constant("answer", " v1.2.3 ", json!(42)).unwrap();
        assert_eq!(capability.version(), &Version::new(1, 2, 3));

        let capability = Capability::constant("answer", "=2.0.0-beta.1", json!(42)).unwrap();
        assert_eq!(capability.version().to_string(), "2.0.0-beta.1");
    }

    #[test]
    fn module_members_are_filtered_at_construction() {
        let capability =
            Capability::module("math", "1.0.0", math(), &ExclusionOptions::default()).unwrap();
        assert_eq!(capability.member_names(), &["add".to_string()]);
        assert_eq!(capability.kind(), CapabilityKind::Module);
    }

    #[test]
    fn descriptor_lists_members_only_for_modules() {
        let module =
            Capability::module("math", "1.0.0", math(), &ExclusionOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_value(module.descriptor()).unwrap(),
            json!({ "kind": "Module", "name": "math", "version": "1.0.0", "memberNames": ["add"] })
        );

        let function = echo();
        assert_eq!(function.descriptor().member_names, None);
        assert_eq!(function.descriptor().kind, CapabilityKind::Function);
    }

    #[test]
    fn function_receives_args_in_order() {
        let (reply, mut pending) = Reply::channel();
        echo().dispatch(Request::new("echo").with_args([json!(1), json!(2)]), reply);
        assert_eq!(
            pending.try_recv().unwrap().into_result().unwrap(),
            vec![json!(1), json!(2)]
        );
    }

    #[test]
    fn constant_ignores_args_and_member() {
        let capability = Capability::constant("answer", "1.0.0", json!(42)).unwrap();
        let request = Request::new("answer")
            .with_member("whatever")
            .with_args([json!("ignored")]);

        let (reply, mut pending) = Reply::channel();
        capability.dispatch(request, reply);
        assert_eq!(pending.try_recv().unwrap().into_result().unwrap(), vec![json!(42)]);
    }

    #[test]
    fn module_requires_member_name() {
        let capability =
            Capability::module("math", "1.0.0", math(), &ExclusionOptions::default()).unwrap();

        let (reply, mut pending) = Reply::channel();
        capability.dispatch(Request::new("math"), reply);
        let err = pending.try_recv().unwrap().into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingMember);

        let (reply, mut pending) = Reply::channel();
        capability.dispatch(Request::new("math").with_member(" "), reply);
        let err = pending.try_recv().unwrap().into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingMember);
    }

    #[test]
    fn excluded_member_is_unsupported() {
        let capability =
            Capability::module("math", "1.0.0", math(), &ExclusionOptions::default()).unwrap();

        let (reply, mut pending) = Reply::channel();
        capability.dispatch(Request::new("math").with_member("_secret"), reply);
        let err = pending.try_recv().unwrap().into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::Unsupported);
    }

    #[test]
    fn module_member_is_invoked() {
        let capability =
            Capability::module("math", "1.0.0", math(), &ExclusionOptions::default()).unwrap();

        let (reply, mut pending) = Reply::channel();
        capability.dispatch(
            Request::new("math")
                .with_member("add")
                .with_args([json!(2), json!(3)]),
            reply,
        );
        assert_eq!(pending.try_recv().unwrap().into_value().unwrap(), json!(5));
    }
}
