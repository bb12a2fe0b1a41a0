//! Handler system for the Chime framework.
//!
//! This module defines the [`Handler`] trait. Handlers are plain async
//! functions taking the decoded event and its [`ResponseContext`]; the trait
//! is implemented for them through a blanket implementation, the way Axum
//! implements its handlers.
//!
//! # Example
//!
//! ```rust,ignore
//! use chime_framework::{AckResponse, InboundEvent, ResponseContext};
//!
//! // Return an ack payload directly
//! async fn hello(_event: InboundEvent, _ctx: ResponseContext) -> AckResponse {
//!     AckResponse::in_channel("hi all")
//! }
//!
//! // Ack by hand after doing other work
//! async fn pong(event: InboundEvent, ctx: ResponseContext) -> Result<(), AckError> {
//!     ctx.post_message(event.channel(), "pong").await;
//!     ctx.ack()
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{error, warn};

use chime_core::{AckResponse, InboundEvent};

use crate::context::ResponseContext;

// ============================================================================
// HandleResponse - Handle handler return values
// ============================================================================

/// A trait for types that can be returned from a handler.
#[async_trait]
pub trait HandleResponse: Send {
    /// Consumes the return value, acting on the context if needed.
    async fn into_response(self, ctx: ResponseContext);
}

/// Implementation for `()` - the handler acknowledged on its own (or chose
/// not to).
#[async_trait]
impl HandleResponse for () {
    async fn into_response(self, _ctx: ResponseContext) {}
}

/// Implementation for `AckResponse` - acknowledges with the returned payload.
#[async_trait]
impl HandleResponse for AckResponse {
    async fn into_response(self, ctx: ResponseContext) {
        if let Err(e) = ctx.ack_with(self) {
            warn!("Failed to acknowledge: {e}");
        }
    }
}

/// Implementation for `Option<T>`.
///
/// On Some, the inner value's response is handled. On None, no action is taken.
#[async_trait]
impl<T: HandleResponse> HandleResponse for Option<T> {
    async fn into_response(self, ctx: ResponseContext) {
        if let Some(t) = self {
            t.into_response(ctx).await;
        }
    }
}

/// Implementation for `Result<T, E>`.
///
/// On Ok, the inner value's response is handled. On Err, the error is logged.
#[async_trait]
impl<T: HandleResponse, E: std::fmt::Display + Send> HandleResponse for Result<T, E> {
    async fn into_response(self, ctx: ResponseContext) {
        match self {
            Ok(t) => t.into_response(ctx).await,
            Err(e) => {
                error!("Handler error: {e}");
            }
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for event handlers.
///
/// Implemented automatically for async functions and closures of the shape
/// `Fn(InboundEvent, ResponseContext) -> impl Future<Output = R>` where `R`
/// implements [`HandleResponse`].
#[async_trait]
pub trait Handler: Clone + Send + Sync + 'static {
    /// Call the handler with the given event and context.
    async fn call(self, event: InboundEvent, ctx: ResponseContext);
}

#[async_trait]
impl<F, Fut, Res> Handler for F
where
    F: FnOnce(InboundEvent, ResponseContext) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: HandleResponse + 'static,
{
    async fn call(self, event: InboundEvent, ctx: ResponseContext) {
        let res = (self)(event, ctx.clone()).await;
        res.into_response(ctx).await;
    }
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in collections
// ============================================================================

/// A type-erased handler that can be stored in the registry.
pub type BoxedHandler =
    Arc<dyn Fn(InboundEvent, ResponseContext) -> BoxFuture<'static, ()> + Send + Sync>;

/// Convert a handler function into a boxed handler.
pub fn into_handler<H: Handler>(h: H) -> BoxedHandler {
    Arc::new(move |event, ctx| h.clone().call(event, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chime_core::{ApiCallResult, MentionEvent, PlatformClient};

    struct NullClient;

    #[async_trait]
    impl PlatformClient for NullClient {
        async fn post_message(&self, _: &str, _: &str) -> ApiCallResult {
            ApiCallResult::success()
        }

        async fn add_reaction(&self, _: &str, _: &str, _: &str) -> ApiCallResult {
            ApiCallResult::success()
        }
    }

    fn event() -> InboundEvent {
        InboundEvent::Mention(MentionEvent {
            channel: "C1".into(),
            text: "<@U0> ping".into(),
            ts: "1.1".into(),
            user: None,
        })
    }

    #[tokio::test]
    async fn test_returned_ack_response_is_sent() {
        async fn reply(_event: InboundEvent, _ctx: ResponseContext) -> AckResponse {
            AckResponse::ephemeral("only you")
        }

        let (ctx, pending) = ResponseContext::new(event(), Arc::new(NullClient));
        into_handler(reply)(event(), ctx).await;

        assert_eq!(pending.wait().await, Some(AckResponse::ephemeral("only you")));
    }

    #[tokio::test]
    async fn test_unit_handler_leaves_ack_to_the_body() {
        let (ctx, pending) = ResponseContext::new(event(), Arc::new(NullClient));
        let handler = into_handler(|_event: InboundEvent, ctx: ResponseContext| async move {
            let _ = ctx.ack();
        });
        handler(event(), ctx).await;

        assert_eq!(pending.wait().await, Some(AckResponse::Empty));
    }

    #[tokio::test]
    async fn test_error_result_does_not_ack() {
        let (ctx, pending) = ResponseContext::new(event(), Arc::new(NullClient));
        let handler = into_handler(|_event: InboundEvent, _ctx: ResponseContext| async move {
            Err::<AckResponse, _>("boom")
        });
        handler(event(), ctx).await;

        assert_eq!(pending.wait().await, None);
    }
}
