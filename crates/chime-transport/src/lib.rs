//! # Chime Transport
//!
//! Slack-facing network layer for the Chime bot framework.
//!
//! ## Features
//!
//! - `http-server` (default): axum webhook server with request signature
//!   verification
//! - `http-client` (default): reqwest client implementing
//!   [`PlatformClient`](chime_core::PlatformClient) over the Web API
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  chime-runtime      │  (wiring, config)
//! ├─────────────────────┤
//! │  chime-framework    │  (dispatcher, handlers)
//! ├─────────────────────┤
//! │  chime-transport    │  <- This crate
//! ├─────────────────────┤
//! │  Slack (HTTP)       │
//! └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chime_transport::http::{SlackClient, SlackClientConfig, WebhookServer, WebhookServerConfig};
//!
//! let client = Arc::new(SlackClient::new(SlackClientConfig::new(token))?);
//! let dispatcher = Dispatcher::new(registry, client);
//!
//! let handle = WebhookServer::new(WebhookServerConfig::default(), dispatcher)
//!     .start()
//!     .await?;
//! ```

pub mod error;

#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

pub use error::{SignatureError, TransportError, TransportResult};

#[cfg(feature = "http-client")]
pub use http::{SlackClient, SlackClientConfig};

#[cfg(feature = "http-server")]
pub use http::{ServerHandle, SignatureVerifier, WebhookServer, WebhookServerConfig};
