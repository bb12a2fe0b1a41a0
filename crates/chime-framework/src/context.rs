//! Response context handed to handlers.
//!
//! One [`ResponseContext`] is created per dispatched event. It carries the
//! event, the shared platform client and the single-use acknowledgment
//! channel. The matching [`PendingAck`] goes to whoever answers the webhook.
//!
//! ```text
//! Dispatcher ──► ResponseContext (handler task)
//!            └─► PendingAck      (transport)
//!
//! ctx.ack() ──oneshot──► pending.wait()
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use chime_core::{AckError, AckResponse, ApiCallResult, BoxedClient, InboundEvent};

use crate::reporter::{CallContext, report_call};

struct Inner {
    event: InboundEvent,
    client: BoxedClient,
    ack_tx: Mutex<Option<oneshot::Sender<AckResponse>>>,
}

/// Per-event context exposing acknowledgment and the platform client.
///
/// Cheap to clone; every clone shares the same acknowledgment slot, so the
/// event is acknowledged at most once however many clones exist.
#[derive(Clone)]
pub struct ResponseContext {
    inner: Arc<Inner>,
}

impl ResponseContext {
    /// Creates a context for `event` together with the receiving half of its
    /// acknowledgment.
    pub fn new(event: InboundEvent, client: BoxedClient) -> (Self, PendingAck) {
        let (tx, rx) = oneshot::channel();
        let ctx = Self {
            inner: Arc::new(Inner {
                event,
                client,
                ack_tx: Mutex::new(Some(tx)),
            }),
        };
        (ctx, PendingAck { rx })
    }

    /// Returns the event being handled.
    pub fn event(&self) -> &InboundEvent {
        &self.inner.event
    }

    /// Returns the source channel of the event.
    pub fn channel_id(&self) -> &str {
        self.inner.event.channel()
    }

    /// Returns the shared platform client.
    pub fn client(&self) -> &BoxedClient {
        &self.inner.client
    }

    /// Acknowledges the event with an empty payload.
    ///
    /// # Errors
    ///
    /// See [`ack_with`](Self::ack_with).
    pub fn ack(&self) -> Result<(), AckError> {
        self.ack_with(AckResponse::Empty)
    }

    /// Acknowledges the event with `response`.
    ///
    /// # Errors
    ///
    /// Returns [`AckError::AlreadyAcknowledged`] on a second call and
    /// [`AckError::ReceiverDropped`] when nobody waits for the ack any more.
    pub fn ack_with(&self, response: AckResponse) -> Result<(), AckError> {
        let tx = self
            .inner
            .ack_tx
            .lock()
            .take()
            .ok_or(AckError::AlreadyAcknowledged)?;

        debug!(empty = response.is_empty(), "Acknowledging event");
        tx.send(response).map_err(|_| AckError::ReceiverDropped)
    }

    /// Returns `true` once `ack` has been called.
    pub fn is_acknowledged(&self) -> bool {
        self.inner.ack_tx.lock().is_none()
    }

    /// Posts `text` to `channel` and reports the outcome.
    pub async fn post_message(&self, channel: &str, text: &str) -> ApiCallResult {
        let result = self.inner.client.post_message(channel, text).await;
        report_call(&CallContext::post_message(channel, text), &result);
        result
    }

    /// Adds reaction `name` to the message at `timestamp` and reports the
    /// outcome.
    pub async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> ApiCallResult {
        let result = self.inner.client.add_reaction(channel, timestamp, name).await;
        report_call(&CallContext::add_reaction(channel, timestamp, name), &result);
        result
    }
}

impl std::fmt::Debug for ResponseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseContext")
            .field("event", &self.inner.event)
            .field("acknowledged", &self.is_acknowledged())
            .finish_non_exhaustive()
    }
}

/// The receiving half of an event's acknowledgment.
#[derive(Debug)]
pub struct PendingAck {
    rx: oneshot::Receiver<AckResponse>,
}

impl PendingAck {
    /// Waits for the handler to acknowledge.
    ///
    /// Returns `None` if every [`ResponseContext`] clone was dropped without
    /// acknowledging, i.e. the handler finished without calling `ack`.
    pub async fn wait(self) -> Option<AckResponse> {
        self.rx.await.ok()
    }
}
