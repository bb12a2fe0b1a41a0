//! Chime Runtime - Orchestration layer for the Chime bot framework.
//!
//! This crate provides:
//! - Layered configuration (`ChimeConfig`, `ConfigLoader`)
//! - Logging setup (`LoggingBuilder`, `init_from_config`)
//! - Runtime orchestration (`ChimeRuntime`): builds the Slack Web API client,
//!   wires the handler registry into a dispatcher and serves the webhook
//!
//! ```ignore
//! use chime_runtime::ChimeRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = ChimeRuntime::builder().build()?;
//!     runtime.register(on_command("/hello").handler(hello));
//!
//!     // Serves until Ctrl+C or SIGTERM
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ChimeConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, init_from_config};
pub use runtime::{ChimeRuntime, RuntimeBuilder};

// Re-export tracing for use by bot crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
