//! Single-use reply continuation.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::envelope::{RemoteError, ReplyEnvelope};

/// Continuation that delivers the answer to one request.
///
/// Every delivery method takes `self`, so a reply can be delivered at most
/// once. Capabilities that need to answer later simply move the `Reply`
/// into whatever task finishes the work.
pub struct Reply {
    deliver: Box<dyn FnOnce(ReplyEnvelope) + Send>,
}

impl Reply {
    /// Wrap a callback.
    pub fn new(deliver: impl FnOnce(ReplyEnvelope) + Send + 'static) -> Self {
        Self {
            deliver: Box::new(deliver),
        }
    }

    /// Create a reply whose envelope can be awaited.
    pub fn channel() -> (Self, PendingReply) {
        let (tx, rx) = oneshot::channel();
        let reply = Self::new(move |envelope| {
            // The caller may have stopped waiting.
            let _ = tx.send(envelope);
        });
        (reply, PendingReply { rx })
    }

    pub fn send(self, envelope: ReplyEnvelope) {
        (self.deliver)(envelope)
    }

    pub fn ok(self, value: Value) {
        self.send(ReplyEnvelope::ok(value))
    }

    pub fn ok_many(self, values: impl IntoIterator<Item = Value>) {
        self.send(ReplyEnvelope::ok_many(values))
    }

    pub fn err(self, error: RemoteError) {
        self.send(ReplyEnvelope::err(error))
    }

    pub fn result(self, result: Result<Value, RemoteError>) {
        match result {
            Ok(value) => self.ok(value),
            Err(error) => self.err(error),
        }
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply").finish_non_exhaustive()
    }
}

/// The receiving half of [`Reply::channel`].
///
/// Resolves to the delivered envelope. If the [`Reply`] is dropped without
/// being delivered it resolves to a transport error instead of waiting
/// forever.
#[derive(Debug)]
pub struct PendingReply {
    rx: oneshot::Receiver<ReplyEnvelope>,
}

impl PendingReply {
    /// Take the envelope if it has already been delivered.
    pub fn try_recv(&mut self) -> Option<ReplyEnvelope> {
        match self.rx.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(dropped()),
        }
    }
}

impl Future for PendingReply {
    type Output = ReplyEnvelope;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| dropped()))
    }
}

fn dropped() -> ReplyEnvelope {
    ReplyEnvelope::err(RemoteError::transport("reply dropped before delivery"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn callback_reply_receives_envelope() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let reply = Reply::new(move |envelope| {
            *sink.lock().unwrap() = Some(envelope);
        });

        reply.ok(json!(42));

        let envelope = seen.lock().unwrap().take().unwrap();
        assert_eq!(envelope.into_value().unwrap(), json!(42));
    }

    #[test]
    fn try_recv_is_empty_until_delivered() {
        let (reply, mut pending) = Reply::channel();
        assert!(pending.try_recv().is_none());

        reply.ok_many([json!(1), json!(2)]);
        let envelope = pending.try_recv().unwrap();
        assert_eq!(envelope.values, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn channel_resolves_with_error() {
        let (reply, pending) = Reply::channel();
        reply.err(RemoteError::capability("nope"));

        let err = pending.await.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::Capability);
        assert_eq!(err.message, "nope");
    }

    #[tokio::test]
    async fn dropped_reply_resolves_to_transport_error() {
        let (reply, pending) = Reply::channel();
        drop(reply);

        let err = pending.await.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::Transport);
    }

    #[tokio::test]
    async fn reply_can_be_delivered_from_another_task() {
        let (reply, pending) = Reply::channel();
        tokio::spawn(async move {
            reply.result(Ok(json!("later")));
        });

        assert_eq!(pending.await.into_value().unwrap(), json!("later"));
    }
}
