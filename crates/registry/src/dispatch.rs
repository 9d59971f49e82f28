//! Turning requests into capability invocations.

use protocol::{RemoteError, Reply, Request, Transport, Value};
use tracing::debug;

use crate::Registry;

impl Registry {
    /// Resolve `request` and invoke the capability it names.
    ///
    /// Validation and resolution failures are answered through `reply`;
    /// nothing here panics or returns an error. A capability that never
    /// answers leaves the reply pending.
    pub fn dispatch(&self, request: Request, reply: Reply) {
        debug!(
            api = %request.api_name,
            member = ?request.member_name,
            version = ?request.version,
            "dispatch"
        );

        if request.api_name.trim().is_empty() {
            return reply.err(RemoteError::invalid_request(
                "missing or invalid capability name",
            ));
        }

        let capability = match self.get(&request.api_name, request.version.as_deref()) {
            Ok(capability) => capability,
            Err(e) => {
                debug!("error {e} while dispatching to {}", request.api_name);
                return reply.err(e.to_remote());
            }
        };

        debug!(
            "found {} {}@{}",
            capability.kind(),
            capability.name(),
            capability.version()
        );
        capability.dispatch(request, reply);
    }

    /// Dispatch a request still in its structured-value form, as handed over
    /// by a transport.
    pub fn dispatch_envelope(&self, envelope: Value, reply: Reply) {
        match serde_json::from_value::<Request>(envelope) {
            Ok(request) => self.dispatch(request, reply),
            Err(e) => reply.err(RemoteError::invalid_request(format!(
                "malformed request: {e}"
            ))),
        }
    }
}

/// In-process delivery straight into [`Registry::dispatch`].
impl Transport for Registry {
    fn send(&self, request: Request, reply: Reply) {
        self.dispatch(request, reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::ErrorCode;
    use semver::Version;
    use serde_json::json;

    fn registry() -> Registry {
        let registry = Registry::new(Version::new(1, 0, 0));
        registry.add_constant("answer", "1.0.0", json!(42)).unwrap();
        registry
    }

    fn code_of(registry: &Registry, envelope: Value) -> ErrorCode {
        let (reply, mut pending) = Reply::channel();
        registry.dispatch_envelope(envelope, reply);
        pending.try_recv().unwrap().into_result().unwrap_err().code
    }

    #[test]
    fn missing_name_is_invalid_request() {
        let registry = registry();
        assert_eq!(code_of(&registry, json!({ "args": [] })), ErrorCode::InvalidRequest);
        assert_eq!(code_of(&registry, json!({ "apiName": "" })), ErrorCode::InvalidRequest);
        assert_eq!(code_of(&registry, json!({ "apiName": 7 })), ErrorCode::InvalidRequest);
    }

    #[test]
    fn unknown_and_unmatched_are_distinct() {
        let registry = registry();
        assert_eq!(
            code_of(&registry, json!({ "apiName": "nope", "version": "*" })),
            ErrorCode::UnknownCapability
        );
        assert_eq!(
            code_of(&registry, json!({ "apiName": "answer", "version": "^2.0.0" })),
            ErrorCode::NoMatchingVersion
        );
    }

    #[test]
    fn registry_is_a_transport() {
        let registry = registry();
        let (reply, mut pending) = Reply::channel();
        registry.send(Request::new("answer").with_version("*"), reply);
        assert_eq!(pending.try_recv().unwrap().into_value().unwrap(), json!(42));
    }
}
