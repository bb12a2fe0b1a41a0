//! HTTP transport: the Slack webhook server and Web API client.

#[cfg(feature = "http-client")]
pub mod client;
#[cfg(feature = "http-server")]
pub mod server;
#[cfg(feature = "http-server")]
pub mod signature;

#[cfg(feature = "http-client")]
pub use client::{SLACK_API_BASE, SlackClient, SlackClientConfig};
#[cfg(feature = "http-server")]
pub use server::{ServerHandle, WebhookServer, WebhookServerConfig};
#[cfg(feature = "http-server")]
pub use signature::SignatureVerifier;
