//! Webhook HTTP server.
//!
//! Receives Slack deliveries on a single POST route, hands them to a
//! dispatching service and turns the handler's acknowledgment into the HTTP
//! response.
//!
//! | Outcome                         | Status |
//! |---------------------------------|--------|
//! | bad or stale signature          | 401    |
//! | undecodable body                | 400    |
//! | no matching handler             | 200    |
//! | unsupported event type          | 200    |
//! | ack received                    | 200    |
//! | handler finished without ack    | 500    |
//! | ack budget elapsed              | 503    |

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::{Service, ServiceExt};
use tracing::{debug, error, info, trace, warn};

use chime_core::RawDelivery;
use chime_framework::DispatchOutcome;

use super::signature::SignatureVerifier;
use crate::error::{TransportError, TransportResult};

/// Settings for the webhook server.
#[derive(Debug, Clone)]
pub struct WebhookServerConfig {
    /// Address to bind, e.g. `0.0.0.0:3000`.
    pub addr: String,
    /// Route receiving deliveries.
    pub path: String,
    /// How long to wait for the handler's acknowledgment.
    pub ack_timeout: Duration,
    /// Verifier for request signatures; `None` disables verification.
    pub verifier: Option<SignatureVerifier>,
}

impl Default for WebhookServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
            path: "/slack/events".to_string(),
            ack_timeout: Duration::from_millis(3000),
            verifier: None,
        }
    }
}

/// Shared state for the webhook route.
struct ServerState<S> {
    service: S,
    ack_timeout: Duration,
    verifier: Option<SignatureVerifier>,
}

/// The webhook server, generic over the dispatching service.
pub struct WebhookServer<S> {
    config: WebhookServerConfig,
    service: S,
}

impl<S> WebhookServer<S>
where
    S: Service<RawDelivery, Response = DispatchOutcome, Error = Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    /// Creates a server that dispatches through `service`.
    pub fn new(config: WebhookServerConfig, service: S) -> Self {
        Self { config, service }
    }

    /// Returns the route path, normalized to start with `/`.
    pub fn path(&self) -> String {
        let path = &self.config.path;
        if path.starts_with('/') {
            path.clone()
        } else {
            format!("/{path}")
        }
    }

    /// Builds the axum router without binding a socket.
    pub fn router(&self) -> Router {
        let state = Arc::new(ServerState {
            service: self.service.clone(),
            ack_timeout: self.config.ack_timeout,
            verifier: self.config.verifier.clone(),
        });

        Router::new()
            .route(&self.path(), post(webhook::<S>))
            .with_state(state)
    }

    /// Binds the listener and starts serving in the background.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Bind`] if the address cannot be bound.
    pub async fn start(self) -> TransportResult<ServerHandle> {
        let router = self.router();
        let path = self.path();

        let listener = tokio::net::TcpListener::bind(&self.config.addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: self.config.addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        info!(addr = %local_addr, path = %path, "Webhook server listening");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("Webhook server shutting down");
            });

            if let Err(e) = server.await {
                error!(error = %e, "Webhook server error");
            }
        });

        Ok(ServerHandle {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }
}

/// Handle to a running webhook server.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Returns the bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            error!(error = %e, "Webhook server task failed");
        }
    }
}

/// Webhook POST handler.
async fn webhook<S>(
    State(state): State<Arc<ServerState<S>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: Service<RawDelivery, Response = DispatchOutcome, Error = Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    trace!(len = body.len(), "Received webhook delivery");

    if let Some(verifier) = &state.verifier
        && let Err(e) = verifier.verify_headers(&headers, &body)
    {
        warn!(error = %e, "Rejected unsigned or stale request");
        return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let raw = RawDelivery::new(content_type, body.to_vec());

    if let Some(challenge) = raw.url_verification_challenge() {
        debug!("Answering url_verification handshake");
        return Json(json!({ "challenge": challenge })).into_response();
    }

    let outcome = match state.service.clone().oneshot(raw).await {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    };

    respond(outcome, state.ack_timeout).await
}

/// Maps a dispatch outcome to the HTTP response.
async fn respond(outcome: DispatchOutcome, ack_timeout: Duration) -> Response {
    let dispatched = match outcome {
        DispatchOutcome::Rejected(e) => {
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
        // Slack retries any non-2xx answer, so dropped events still get 200.
        DispatchOutcome::Unmatched | DispatchOutcome::Ignored(_) => {
            return StatusCode::OK.into_response();
        }
        DispatchOutcome::Dispatched(d) => d,
    };

    match tokio::time::timeout(ack_timeout, dispatched.ack.wait()).await {
        Ok(Some(ack)) => match ack.to_body() {
            Some(body) => Json(body).into_response(),
            None => StatusCode::OK.into_response(),
        },
        Ok(None) => {
            error!(
                handler = %dispatched.handler,
                "Handler finished without acknowledging"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(_) => {
            warn!(
                handler = %dispatched.handler,
                timeout_ms = ack_timeout.as_millis() as u64,
                "Acknowledgment budget elapsed"
            );
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
