//! Request/response correlation over a one-way message channel.
//!
//! The wallet extension can only be reached with fire-and-forget messages, and its replies arrive in any order.
//! [`CorrelationEngine`] turns that into ordinary awaitable calls:
//!
//! - [`CorrelationEngine::issue`] picks a [`CorrelationId`] that is not currently pending, registers a oneshot
//!   completion under it, and only then hands a [`RequestFrame`] to the [`Transport`].
//! - The transport collaborator calls [`ReplyHandle::deliver_reply`] for every inbound reply. Lookup and removal from
//!   the [`PendingRequests`] set happen under one lock, and only the caller that removed a completion settles it, so
//!   each request settles at most once. Replies for unknown ids (duplicates, late replies, strays) are dropped.
//!
//! There is no built-in timeout. A request whose reply never arrives stays pending until it is
//! [abandoned](CorrelationEngine::abandon) or the engine is dropped, at which point its [`PendingReply`] resolves to
//! [`ProviderError::ChannelClosed`].

use crate::error::{ProviderError, RemoteError};
use crate::frame::{ReplyFrame, RequestFrame};
use crate::method::RemoteMethod;
use crate::request::RemoteRequest;
use futures::channel::oneshot;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

/// Largest id handed out. Ids stay within the range a JavaScript number represents exactly, so they survive a round
/// trip through the extension unchanged.
pub const MAX_CORRELATION_ID: u64 = (1 << 53) - 1;

type Completion = oneshot::Sender<Result<Value, ProviderError>>;

/// Opaque token matching a reply to the request that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(u64);

impl CorrelationId {
    /// A uniformly random id in `1..=MAX_CORRELATION_ID`.
    pub fn random() -> Self {
        Self(rand::random_range(1..=MAX_CORRELATION_ID))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for CorrelationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-way dispatch across the context boundary.
///
/// Delivery failures are the transport's business; nothing is reported back to the engine. Implementations may
/// deliver the reply before `send` returns.
pub trait Transport: Send + Sync {
    fn send(&self, frame: RequestFrame);
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, frame: RequestFrame) {
        (**self).send(frame)
    }
}

/// The set of requests awaiting a reply, keyed by correlation id.
#[derive(Default)]
pub struct PendingRequests {
    pending: HashMap<CorrelationId, Completion>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self { pending: HashMap::new() }
    }

    /// Generate an id that does not collide with any request currently pending.
    pub fn fresh_id(&self) -> CorrelationId {
        loop {
            let id = CorrelationId::random();
            if !self.pending.contains_key(&id) {
                return id;
            }
            trace!("Correlation id {id} is already pending. Trying again");
        }
    }

    /// Register a completion under `id`. Returns false (and leaves the existing entry alone) if `id` is taken.
    pub fn register_pending_request(&mut self, id: CorrelationId, completion: Completion) -> bool {
        if self.pending.contains_key(&id) {
            error!("Refusing to register request {id}: the id is already pending");
            return false;
        }
        self.pending.insert(id, completion);
        true
    }

    pub fn remove_pending_request(&mut self, id: CorrelationId) -> Option<Completion> {
        self.pending.remove(&id)
    }

    pub fn contains(&self, id: CorrelationId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn ids(&self) -> Vec<CorrelationId> {
        self.pending.keys().copied().collect()
    }
}

fn lock(pending: &Mutex<PendingRequests>) -> MutexGuard<'_, PendingRequests> {
    // Every operation is a single insert or remove, so a poisoned map is still consistent.
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

fn settle(id: CorrelationId, completion: Completion, outcome: Result<Value, ProviderError>) {
    if completion.send(outcome).is_err() {
        debug!("Reply for request {id} arrived, but the caller is no longer waiting for it.");
    }
}

/// The inbound half of the engine, handed to the transport collaborator.
///
/// It can be cheaply cloned and shared among threads. It does not depend on the transport type.
#[derive(Clone, Default)]
pub struct ReplyHandle {
    pending: Arc<Mutex<PendingRequests>>,
}

impl ReplyHandle {
    /// Route one inbound reply to its pending request.
    ///
    /// With a truthy `error`, the request fails with [`ProviderError::Remote`] carrying the payload verbatim;
    /// otherwise it resolves with `value`. Unknown ids are ignored. Returns whether a pending request was settled.
    pub fn deliver_reply(&self, id: CorrelationId, error: Option<RemoteError>, value: Value) -> bool {
        let Some(completion) = lock(&self.pending).remove_pending_request(id) else {
            warn!("Dropping reply for unknown or already settled request {id}");
            return false;
        };
        let outcome = match error.filter(|e| !e.is_falsy()) {
            Some(e) => {
                debug!("<== Request {id} failed: {e}");
                Err(ProviderError::Remote(e))
            }
            None => {
                debug!("<== Request {id} succeeded: {value}");
                Ok(value)
            }
        };
        settle(id, completion, outcome);
        true
    }

    pub fn deliver(&self, frame: ReplyFrame) -> bool {
        self.deliver_reply(frame.id, frame.error, frame.result)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

/// Maps named remote operations onto uniquely identified, exactly-once-settled results.
pub struct CorrelationEngine<T> {
    replies: ReplyHandle,
    transport: T,
}

impl<T: Transport> CorrelationEngine<T> {
    pub fn new(transport: T) -> Self {
        Self { replies: ReplyHandle::default(), transport }
    }

    /// The handle the transport collaborator uses to deliver inbound replies.
    pub fn reply_handle(&self) -> ReplyHandle {
        self.replies.clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue a typed request.
    pub fn issue(&self, request: RemoteRequest) -> PendingReply {
        self.dispatch(request.method(), request.payload())
    }

    /// Issue a request by its caller-facing method name.
    ///
    /// Names outside the method table fail with [`ProviderError::UnsupportedMethod`] before an id is generated or
    /// anything is sent.
    pub fn issue_named(&self, method: &str, payload: Value) -> Result<PendingReply, ProviderError> {
        let method = method.parse::<RemoteMethod>()?;
        Ok(self.dispatch(method, payload))
    }

    fn dispatch(&self, method: RemoteMethod, payload: Value) -> PendingReply {
        let (sender, receiver) = oneshot::channel();
        let id = {
            let mut pending = lock(&self.replies.pending);
            let id = pending.fresh_id();
            pending.register_pending_request(id, sender);
            id
        };
        // The lock must be released before sending: the transport may deliver the reply re-entrantly.
        debug!("==> Request {id}: {method} (wire: {}), payload {payload}", method.wire_name());
        self.transport.send(RequestFrame::new(id, method.wire_name(), payload));
        PendingReply { id, receiver }
    }

    /// Give up on a pending request. Its [`PendingReply`] resolves with [`ProviderError::Timeout`] and any later reply
    /// for it is ignored. Returns false if the request was not pending.
    pub fn abandon(&self, id: CorrelationId) -> bool {
        let completion = lock(&self.replies.pending).remove_pending_request(id);
        match completion {
            Some(completion) => {
                info!("Abandoning request {id}");
                settle(id, completion, Err(ProviderError::Timeout { id }));
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.replies.pending_count()
    }

    pub fn is_pending(&self, id: CorrelationId) -> bool {
        lock(&self.replies.pending).contains(id)
    }

    pub fn pending_ids(&self) -> Vec<CorrelationId> {
        lock(&self.replies.pending).ids()
    }
}

/// Resolves exactly once, when the reply carrying [`PendingReply::id`] is delivered.
#[must_use = "the reply is lost unless the PendingReply is awaited"]
pub struct PendingReply {
    id: CorrelationId,
    receiver: oneshot::Receiver<Result<Value, ProviderError>>,
}

impl PendingReply {
    pub fn id(&self) -> CorrelationId {
        self.id
    }
}

impl Future for PendingReply {
    type Output = Result<Value, ProviderError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(ProviderError::ChannelClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}
