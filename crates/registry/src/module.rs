//! Module capabilities: named members sharing one piece of state.

use std::collections::BTreeMap;
use std::sync::Arc;

use protocol::{Reply, Value};

/// Returned by [`Module::call`] when the member does not exist or cannot be
/// invoked. Hands the untouched reply back so the caller can answer it.
#[derive(Debug)]
pub struct Unsupported(pub Reply);

/// An object whose members can be called remotely.
///
/// Modules declare their members explicitly; the registry filters that list
/// through [`ExclusionOptions`](crate::ExclusionOptions) once, when the module
/// is added.
pub trait Module: Send + Sync {
    /// Every member name, before exclusion filtering.
    fn members(&self) -> Vec<String>;

    /// Invoke `member` with `args`. The member answers through `reply`,
    /// now or later.
    fn call(&self, member: &str, args: Vec<Value>, reply: Reply) -> Result<(), Unsupported>;
}

type Method<S> = Arc<dyn Fn(&S, Vec<Value>, Reply) + Send + Sync>;

/// A [`Module`] built from a state value and a table of methods.
///
/// Each method receives the state as its receiver, so members can share
/// whatever the module owns. Use interior mutability in `S` for state that
/// changes between calls.
///
/// ```
/// use protocol::{Reply, Value};
/// use registry::{MethodTable, Module};
/// use std::sync::atomic::{AtomicI64, Ordering};
///
/// let counter = MethodTable::new(AtomicI64::new(0))
///     .method("increment", |count: &AtomicI64, _args: Vec<Value>, reply: Reply| {
///         let next = count.fetch_add(1, Ordering::SeqCst) + 1;
///         reply.ok(next.into());
///     });
///
/// assert_eq!(counter.members(), vec!["increment".to_string()]);
/// ```
pub struct MethodTable<S> {
    state: S,
    methods: BTreeMap<String, Method<S>>,
}

impl<S> MethodTable<S>
where
    S: Send + Sync + 'static,
{
    pub fn new(state: S) -> Self {
        Self {
            state,
            methods: BTreeMap::new(),
        }
    }

    /// Add a method. A second method with the same name replaces the first.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&S, Vec<Value>, Reply) + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }
}

impl MethodTable<()> {
    /// A table whose methods need no shared state.
    pub fn stateless() -> Self {
        Self::new(())
    }
}

impl<S> Module for MethodTable<S>
where
    S: Send + Sync + 'static,
{
    fn members(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    fn call(&self, member: &str, args: Vec<Value>, reply: Reply) -> Result<(), Unsupported> {
        match self.methods.get(member) {
            Some(method) => {
                method(&self.state, args, reply);
                Ok(())
            }
            None => Err(Unsupported(reply)),
        }
    }
}

impl<S> std::fmt::Debug for MethodTable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodTable")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn methods_see_shared_state() {
        let table = MethodTable::new(Mutex::new(Vec::<Value>::new()))
            .method("push", |items: &Mutex<Vec<Value>>, args: Vec<Value>, reply: Reply| {
                items.lock().extend(args);
                reply.ok(Value::Null);
            })
            .method("len", |items: &Mutex<Vec<Value>>, _args: Vec<Value>, reply: Reply| {
                reply.ok(json!(items.lock().len()));
            });

        let (reply, _pending) = Reply::channel();
        table.call("push", vec![json!(1), json!(2)], reply).unwrap();

        let (reply, mut pending) = Reply::channel();
        table.call("len", Vec::new(), reply).unwrap();
        assert_eq!(pending.try_recv().unwrap().into_value().unwrap(), json!(2));
    }

    #[test]
    fn unknown_member_returns_reply() {
        let table = MethodTable::stateless();
        let (reply, mut pending) = Reply::channel();

        let Err(Unsupported(reply)) = table.call("missing", Vec::new(), reply) else {
            panic!("expected unsupported");
        };
        assert!(pending.try_recv().is_none());

        reply.ok(json!("handled by caller"));
        assert!(pending.try_recv().is_some());
    }

    #[test]
    fn members_are_method_names() {
        let table = MethodTable::stateless()
            .method("b", |_: &(), _, reply: Reply| reply.ok(Value::Null))
            .method("a", |_: &(), _, reply: Reply| reply.ok(Value::Null));
        assert_eq!(table.members(), vec!["a".to_string(), "b".to_string()]);
    }
}
