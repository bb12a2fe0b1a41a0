//! Result reporting for platform API calls.
//!
//! Handlers report every [`PlatformClient`](chime_core::PlatformClient) call
//! through [`report_call`]. A successful call produces an `info` event naming
//! the operation; a failed one produces an `error` event with every
//! contextual field and the failure reason.

use std::fmt;

use tracing::{error, info};

use chime_core::ApiCallResult;

/// The call being reported, with the fields that identify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallContext {
    /// A `post_message` call.
    PostMessage { channel: String, text: String },
    /// An `add_reaction` call.
    AddReaction {
        channel: String,
        timestamp: String,
        reaction: String,
    },
}

impl CallContext {
    /// Creates the context of a `post_message` call.
    pub fn post_message(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self::PostMessage {
            channel: channel.into(),
            text: text.into(),
        }
    }

    /// Creates the context of an `add_reaction` call.
    pub fn add_reaction(
        channel: impl Into<String>,
        timestamp: impl Into<String>,
        reaction: impl Into<String>,
    ) -> Self {
        Self::AddReaction {
            channel: channel.into(),
            timestamp: timestamp.into(),
            reaction: reaction.into(),
        }
    }

    /// Human-readable operation name.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::PostMessage { .. } => "Post message",
            Self::AddReaction { .. } => "Add reaction",
        }
    }
}

/// A rendered report line for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReport<'a> {
    context: &'a CallContext,
    result: &'a ApiCallResult,
}

impl<'a> CallReport<'a> {
    pub fn new(context: &'a CallContext, result: &'a ApiCallResult) -> Self {
        Self { context, result }
    }

    /// Returns whether the reported call succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for CallReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation = self.context.operation();
        if self.result.is_ok() {
            return write!(f, "{operation} success.");
        }

        write!(f, "{operation} failed. ")?;
        match self.context {
            CallContext::PostMessage { channel, text } => {
                write!(f, "channel_id = {channel}, message = {text}")?;
            }
            CallContext::AddReaction {
                channel,
                timestamp,
                reaction,
            } => {
                write!(
                    f,
                    "channel_id = {channel}, timestamp = {timestamp}, reaction = {reaction}"
                )?;
            }
        }
        write!(f, ", reason = {}", self.result.error().unwrap_or("unknown"))
    }
}

/// Logs the outcome of a platform call and returns the rendered report.
///
/// Never panics and never changes the caller's control flow; the returned
/// report is only useful for assertions.
pub fn report_call<'a>(context: &'a CallContext, result: &'a ApiCallResult) -> CallReport<'a> {
    let report = CallReport::new(context, result);
    if report.is_success() {
        info!("{report}");
    } else {
        error!(
            operation = context.operation(),
            reason = result.error().unwrap_or("unknown"),
            "{report}"
        );
    }
    report
}
