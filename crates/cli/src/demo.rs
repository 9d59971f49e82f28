//! Capabilities the binary exposes out of the box.

use protocol::{RemoteError, Reply, Value};
use registry::{MethodTable, Registry, Result};
use serde_json::json;

/// Register the demo capabilities on `registry`.
pub fn install(registry: &Registry) -> Result<()> {
    registry.add_module("math", "1.0.0", math(), None)?;
    registry.add_function("echo", "1.0.0", |args: Vec<Value>, reply: Reply| {
        reply.ok_many(args)
    })?;
    registry.add_constant("greeting", "1.0.0", json!("hello"))?;
    registry.add_constant("greeting", "1.1.0", json!("hello, world"))?;
    Ok(())
}

fn math() -> MethodTable<()> {
    MethodTable::stateless()
        .method("add", |_: &(), args: Vec<Value>, reply: Reply| {
            reply.result(numbers("add", &args).map(|n| json!(n.iter().sum::<f64>())))
        })
        .method("multiply", |_: &(), args: Vec<Value>, reply: Reply| {
            reply.result(numbers("multiply", &args).map(|n| json!(n.iter().product::<f64>())))
        })
        .method("_precision", |_: &(), _args: Vec<Value>, reply: Reply| {
            reply.ok(json!(f64::EPSILON))
        })
}

fn numbers(member: &str, args: &[Value]) -> std::result::Result<Vec<f64>, RemoteError> {
    args.iter()
        .map(|arg| {
            arg.as_f64()
                .ok_or_else(|| RemoteError::capability(format!("{member} expects numbers, got {arg}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{ErrorCode, Request};

    fn call(registry: &Registry, request: Request) -> std::result::Result<Vec<Value>, RemoteError> {
        let (reply, mut pending) = Reply::channel();
        registry.dispatch(request, reply);
        pending.try_recv().unwrap().into_result()
    }

    #[test]
    fn math_members() {
        let registry = Registry::new(semver::Version::new(1, 0, 0));
        install(&registry).unwrap();

        let sum = call(
            &registry,
            Request::new("math")
                .with_version("*")
                .with_member("add")
                .with_args([json!(1), json!(2.5)]),
        )
        .unwrap();
        assert_eq!(sum, vec![json!(3.5)]);

        let err = call(
            &registry,
            Request::new("math")
                .with_version("*")
                .with_member("multiply")
                .with_args([json!("x")]),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Capability);

        let hidden = call(
            &registry,
            Request::new("math").with_version("*").with_member("_precision"),
        )
        .unwrap_err();
        assert_eq!(hidden.code, ErrorCode::Unsupported);
    }

    #[test]
    fn greeting_resolves_latest() {
        let registry = Registry::new(semver::Version::new(1, 0, 0));
        install(&registry).unwrap();

        let values = call(&registry, Request::new("greeting").with_version("^1")).unwrap();
        assert_eq!(values, vec![json!("hello, world")]);
        let values = call(&registry, Request::new("greeting")).unwrap();
        assert_eq!(values, vec![json!("hello")]);
    }
}
