//! # Chime
//!
//! An event-driven, type-safe Slack bot framework for Rust.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐ RawDelivery ┌────────────┐ InboundEvent ┌─────────┐
//! │ WebhookServer │────────────▶│ Dispatcher │─────────────▶│ Handler │──▶ PlatformClient
//! │  (transport)  │◀────────────│            │  own task    │         │
//! └───────────────┘     ack     └────────────┘              └─────────┘
//! ```
//!
//! - **Runtime**: Loads configuration, sets up logging, serves the webhook
//! - **Dispatcher**: Decodes deliveries and picks the first handler whose
//!   matcher accepts the event
//! - **Handlers**: Async functions taking the event and a
//!   [`ResponseContext`](chime_framework::ResponseContext); they acknowledge
//!   and call the Slack Web API through it
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chime::prelude::*;
//!
//! async fn hello(_event: InboundEvent, _ctx: ResponseContext) -> AckResponse {
//!     AckResponse::in_channel("hello")
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = ChimeRuntime::builder().build()?;
//!     runtime.register(on_command("/hello").handler(hello));
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: Load `chime.toml` files (default)
//! - `json-log`: Allow `logging.format = "json"`

pub use chime_core as core;
pub use chime_framework as framework;
pub use chime_runtime as runtime;
pub use chime_transport as transport;

/// Commonly used types for building a bot.
///
/// ```rust,ignore
/// use chime::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use chime_runtime::{ChimeConfig, ChimeRuntime};

    // Event model and acknowledgments
    pub use chime_core::{
        AckResponse, ApiCallResult, BoxedClient, EventKind, InboundEvent, MentionEvent,
        MessageEvent, PlatformClient, SlashCommand, Visibility,
    };

    // Handler registration
    pub use chime_framework::{
        HandlerEntry, HandlerRegistry, Matcher, ResponseContext, on_command, on_event,
        on_message_matching,
    };
}
