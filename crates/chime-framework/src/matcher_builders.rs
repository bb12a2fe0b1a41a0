//! Builder functions for common handler entries.
//!
//! # Example
//!
//! ```rust,ignore
//! use chime_framework::{on_command, on_event, on_message_matching};
//!
//! let registry = HandlerRegistry::new()
//!     .with(on_command("/hello").handler(hello))
//!     .with(on_event(EventKind::AppMention).handler(mention))
//!     .with(on_message_matching("あなたとJava")?.handler(java));
//! ```

use chime_core::EventKind;

use crate::handler::Handler;
use crate::matcher::Matcher;
use crate::registry::HandlerEntry;

/// A matcher waiting for its handler.
#[derive(Debug, Clone)]
pub struct HandlerEntryBuilder {
    name: String,
    matcher: Matcher,
}

impl HandlerEntryBuilder {
    /// Starts an entry from an arbitrary matcher. The matcher's description
    /// becomes the default name.
    pub fn new(matcher: Matcher) -> Self {
        Self {
            name: matcher.to_string(),
            matcher,
        }
    }

    /// Overrides the name used in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attaches the handler, producing the entry.
    pub fn handler<H: Handler>(self, handler: H) -> HandlerEntry {
        HandlerEntry::new(self.name, self.matcher, handler)
    }
}

/// Creates an entry builder for the slash command `name` (e.g. `/hello`).
pub fn on_command(name: impl Into<String>) -> HandlerEntryBuilder {
    HandlerEntryBuilder::new(Matcher::command(name))
}

/// Creates an entry builder for every event of `kind`.
pub fn on_event(kind: EventKind) -> HandlerEntryBuilder {
    HandlerEntryBuilder::new(Matcher::event(kind))
}

/// Creates an entry builder for channel messages whose text contains a match
/// for `pattern`.
///
/// # Errors
///
/// Returns the regex compilation error for an invalid pattern.
pub fn on_message_matching(pattern: &str) -> Result<HandlerEntryBuilder, regex::Error> {
    let matcher = Matcher::all([Matcher::event(EventKind::Message), Matcher::regex(pattern)?]);
    Ok(HandlerEntryBuilder::new(matcher).name(format!("message:{pattern}")))
}
