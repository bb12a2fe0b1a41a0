//! Matcher system for the Chime framework.
//!
//! A [`Matcher`] is a pure predicate over an [`InboundEvent`]. The registry
//! pairs each matcher with one handler and fires the first entry whose
//! matcher returns `true`.
//!
//! # Example
//!
//! ```rust,ignore
//! use chime_framework::Matcher;
//! use chime_core::EventKind;
//!
//! let hello = Matcher::command("/hello");
//! let mention = Matcher::event(EventKind::AppMention);
//! let java = Matcher::regex("あなたとJava")?;
//!
//! // Only channel messages whose body contains the pattern
//! let java_message = Matcher::all([Matcher::event(EventKind::Message), java]);
//! ```

use std::fmt;

use regex::Regex;
use tracing::trace;

use chime_core::{EventKind, InboundEvent};

/// A pure predicate deciding whether a handler should process an event.
///
/// Matchers never touch the network or any shared state, so evaluating one
/// is cheap and can happen on any number of dispatches concurrently.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Matches slash commands whose command name equals the string exactly
    /// (case-sensitive).
    ExactCommand(String),

    /// Matches events of the given variant.
    EventType(EventKind),

    /// Matches events whose text body contains a match for the regex.
    /// Search semantics: no anchoring is implied.
    RegexBody(Regex),

    /// Matches when every inner matcher matches. An empty list matches all
    /// events.
    All(Vec<Matcher>),
}

impl Matcher {
    /// Creates an exact command-name matcher.
    pub fn command(name: impl Into<String>) -> Self {
        Self::ExactCommand(name.into())
    }

    /// Creates an event-type matcher.
    pub fn event(kind: EventKind) -> Self {
        Self::EventType(kind)
    }

    /// Compiles `pattern` into a body matcher.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::RegexBody(Regex::new(pattern)?))
    }

    /// Combines matchers into a conjunction.
    pub fn all(matchers: impl IntoIterator<Item = Matcher>) -> Self {
        Self::All(matchers.into_iter().collect())
    }

    /// Checks whether this matcher accepts the given event.
    pub fn matches(&self, event: &InboundEvent) -> bool {
        let matched = match self {
            Self::ExactCommand(name) => {
                matches!(event, InboundEvent::SlashCommand(c) if c.command == *name)
            }
            Self::EventType(kind) => event.kind() == *kind,
            Self::RegexBody(re) => {
                let body = event.text();
                !body.is_empty() && re.is_match(body)
            }
            Self::All(inner) => inner.iter().all(|m| m.matches(event)),
        };

        trace!(matcher = %self, kind = %event.kind(), matched, "Matcher evaluated");
        matched
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactCommand(name) => write!(f, "command:{name}"),
            Self::EventType(kind) => write!(f, "event:{kind}"),
            Self::RegexBody(re) => write!(f, "regex:{}", re.as_str()),
            Self::All(inner) => {
                f.write_str("all(")?;
                for (i, m) in inner.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{m}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_core::{MentionEvent, MessageEvent, SlashCommand};

    fn slash(command: &str, text: &str) -> InboundEvent {
        InboundEvent::SlashCommand(SlashCommand {
            command: command.to_string(),
            channel: "C1".to_string(),
            text: text.to_string(),
            user_id: None,
            response_url: None,
            trigger_id: None,
        })
    }

    fn mention(text: &str) -> InboundEvent {
        InboundEvent::Mention(MentionEvent {
            channel: "C1".to_string(),
            text: text.to_string(),
            ts: "1.1".to_string(),
            user: None,
        })
    }

    fn message(text: &str) -> InboundEvent {
        InboundEvent::Message(MessageEvent {
            channel: "C1".to_string(),
            text: text.to_string(),
            ts: "1.2".to_string(),
            user: None,
            subtype: None,
        })
    }

    #[test]
    fn test_exact_command() {
        let m = Matcher::command("/hello");

        assert!(m.matches(&slash("/hello", "")));
        assert!(!m.matches(&slash("/help", "")));
        assert!(!m.matches(&slash("/Hello", "")));
        assert!(!m.matches(&mention("/hello")));
    }

    #[test]
    fn test_event_type() {
        let m = Matcher::event(EventKind::AppMention);

        assert!(m.matches(&mention("<@U0> ping")));
        assert!(!m.matches(&message("<@U0> ping")));
        assert!(!m.matches(&slash("/hello", "")));
    }

    #[test]
    fn test_regex_is_search_not_full_match() {
        let m = Matcher::regex("あなたとJava").unwrap();

        assert!(m.matches(&message("prefix あなたとJava suffix")));
        assert!(m.matches(&message("あなたとJava")));
        assert!(!m.matches(&message("あなたとKotlin")));
    }

    #[test]
    fn test_regex_empty_body_never_matches() {
        let m = Matcher::regex(".*").unwrap();
        assert!(!m.matches(&message("")));
    }

    #[test]
    fn test_regex_applies_to_every_variant() {
        let m = Matcher::regex("Java").unwrap();
        assert!(m.matches(&mention("<@U0> Java")));
        assert!(m.matches(&slash("/any", "Java")));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        assert!(Matcher::regex("(unclosed").is_err());
    }

    #[test]
    fn test_all_requires_every_matcher() {
        let m = Matcher::all([
            Matcher::event(EventKind::Message),
            Matcher::regex("Java").unwrap(),
        ]);

        assert!(m.matches(&message("I like Java")));
        assert!(!m.matches(&mention("<@U0> Java")));
        assert!(!m.matches(&message("I like Rust")));
        assert!(Matcher::all([]).matches(&message("")));
    }

    #[test]
    fn test_display() {
        let m = Matcher::all([Matcher::event(EventKind::Message), Matcher::command("/x")]);
        assert_eq!(m.to_string(), "all(event:message, command:/x)");
    }
}
