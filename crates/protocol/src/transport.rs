//! Transport collaborator trait.

use crate::envelope::Request;
use crate::reply::Reply;

/// Carries requests to a remote registry and replies back.
///
/// Implementations deliver `request` by any means and eventually call
/// `reply` at most once, with the remote's answer or with a transport error
/// if delivery failed. `send` should return promptly; the answer may arrive
/// later from another thread or task.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request, reply: Reply);
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: Request, reply: Reply) {
        (**self).send(request, reply)
    }
}

/// A [`Transport`] backed by a closure. See [`transport_fn`].
pub struct FnTransport<F> {
    send: F,
}

impl<F> Transport for FnTransport<F>
where
    F: Fn(Request, Reply) + Send + Sync,
{
    fn send(&self, request: Request, reply: Reply) {
        (self.send)(request, reply)
    }
}

impl<F> std::fmt::Debug for FnTransport<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransport").finish_non_exhaustive()
    }
}

/// Build a transport from a `send` closure.
pub fn transport_fn<F>(send: F) -> FnTransport<F>
where
    F: Fn(Request, Reply) + Send + Sync,
{
    FnTransport { send }
}
