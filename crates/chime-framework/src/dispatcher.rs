//! Event dispatcher for the Chime framework.
//!
//! The [`Dispatcher`] turns one webhook delivery into at most one handler
//! invocation:
//!
//! 1. The [`RawDelivery`] is decoded into an [`InboundEvent`]
//! 2. The [`HandlerRegistry`] resolves the first matching entry
//! 3. The entry's handler is spawned on its own task with a fresh
//!    [`ResponseContext`]
//!
//! Dispatch itself never fails and never waits for the handler. The caller
//! receives a [`DispatchOutcome`] and decides how long to wait for the
//! acknowledgment.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::new(registry, client);
//!
//! match dispatcher.dispatch(&raw) {
//!     DispatchOutcome::Dispatched(d) => {
//!         let ack = d.ack.wait().await;
//!     }
//!     DispatchOutcome::Unmatched | DispatchOutcome::Ignored(_) => {}
//!     DispatchOutcome::Rejected(err) => warn!("{err}"),
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{Ready, ready};
use tokio::task::JoinHandle;
use tracing::{Instrument, Level, debug, span, warn};

use chime_core::{BoxedClient, DecodeError, InboundEvent, RawDelivery};

use crate::context::{PendingAck, ResponseContext};
use crate::registry::HandlerRegistry;

/// A handler that was started for an event.
#[derive(Debug)]
pub struct Dispatched {
    /// Name of the entry that matched.
    pub handler: String,
    /// Resolves when the handler acknowledges.
    pub ack: PendingAck,
    /// The spawned handler task.
    pub task: JoinHandle<()>,
}

/// The result of dispatching one delivery.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The delivery could not be decoded; no handler ran.
    Rejected(DecodeError),
    /// A well-formed delivery of an envelope or event type the bot does not
    /// handle, e.g. `reaction_added`. Dropped like an unmatched event.
    Ignored(DecodeError),
    /// No registered matcher accepted the event; it was dropped.
    Unmatched,
    /// A handler was spawned.
    Dispatched(Dispatched),
}

impl DispatchOutcome {
    /// Returns `true` if a handler was spawned.
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched(_))
    }
}

/// The central event dispatcher.
///
/// Holds the frozen registry and the shared platform client. Cloning is cheap
/// and clones share both.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    client: BoxedClient,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`. The registry cannot change
    /// afterwards.
    pub fn new(registry: HandlerRegistry, client: BoxedClient) -> Self {
        Self {
            registry: Arc::new(registry),
            client,
        }
    }

    /// Returns the registry in use.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Decodes and dispatches one delivery.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, raw: &RawDelivery) -> DispatchOutcome {
        match raw.decode() {
            Ok(event) => self.dispatch_event(event),
            Err(e @ (DecodeError::UnsupportedEvent(_) | DecodeError::UnsupportedEnvelope)) => {
                debug!("Ignoring delivery: {e}");
                DispatchOutcome::Ignored(e)
            }
            Err(e) => {
                warn!("Rejected delivery: {e}");
                DispatchOutcome::Rejected(e)
            }
        }
    }

    /// Dispatches an already decoded event.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch_event(&self, event: InboundEvent) -> DispatchOutcome {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            kind = %event.kind(),
            discriminator = event.discriminator(),
            channel = event.channel(),
        );
        let _enter = span.enter();

        let Some(entry) = self.registry.resolve(&event) else {
            debug!("No handler matched, dropping event");
            return DispatchOutcome::Unmatched;
        };

        debug!(handler = entry.name(), "Dispatching event");

        let (ctx, ack) = ResponseContext::new(event.clone(), Arc::clone(&self.client));
        let handler = Arc::clone(entry.handler());
        let task = tokio::spawn(handler(event, ctx).instrument(span.clone()));

        DispatchOutcome::Dispatched(Dispatched {
            handler: entry.name().to_string(),
            ack,
            task,
        })
    }
}

impl tower::Service<RawDelivery> for Dispatcher {
    type Response = DispatchOutcome;
    type Error = Infallible;
    type Future = Ready<Result<DispatchOutcome, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, raw: RawDelivery) -> Self::Future {
        ready(Ok(self.dispatch(&raw)))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("entry_count", &self.registry.len())
            .finish_non_exhaustive()
    }
}
