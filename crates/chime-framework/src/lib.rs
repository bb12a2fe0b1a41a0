//! # Chime Framework
//!
//! High-level framework components for building Slack bots.
//!
//! This layer provides:
//! - Matchers selecting which handler processes an event
//! - Handler trait for plain async functions
//! - An ordered handler registry (first match wins)
//! - The dispatcher and per-event response context with single-use ack
//! - Result reporting for platform API calls

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod matcher;
pub mod matcher_builders;
pub mod registry;
pub mod reporter;

pub use context::{PendingAck, ResponseContext};
pub use dispatcher::{DispatchOutcome, Dispatched, Dispatcher};
pub use handler::{BoxedHandler, HandleResponse, Handler, into_handler};
pub use matcher::Matcher;
pub use matcher_builders::{HandlerEntryBuilder, on_command, on_event, on_message_matching};
pub use registry::{HandlerEntry, HandlerRegistry};
pub use reporter::{CallContext, CallReport, report_call};
