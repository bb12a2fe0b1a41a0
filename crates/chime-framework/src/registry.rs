//! Ordered handler registry.
//!
//! Entries are registered once at startup and checked in registration order;
//! the first entry whose matcher accepts an event handles it. Register
//! specific matchers before broad ones.

use tracing::trace;

use chime_core::InboundEvent;

use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::matcher::Matcher;

/// One registered `(matcher, handler)` pair.
#[derive(Clone)]
pub struct HandlerEntry {
    name: String,
    matcher: Matcher,
    handler: BoxedHandler,
}

impl HandlerEntry {
    /// Creates an entry. The name only appears in logs.
    pub fn new<H: Handler>(name: impl Into<String>, matcher: Matcher, handler: H) -> Self {
        Self {
            name: name.into(),
            matcher,
            handler: into_handler(handler),
        }
    }

    /// Returns the entry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entry's matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Returns the type-erased handler.
    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("name", &self.name)
            .field("matcher", &self.matcher.to_string())
            .finish_non_exhaustive()
    }
}

/// The ordered list of handler entries.
#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    entries: Vec<HandlerEntry>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn register(&mut self, entry: HandlerEntry) {
        self.entries.push(entry);
    }

    /// Appends an entry (builder pattern).
    pub fn with(mut self, entry: HandlerEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in registration order.
    pub fn entries(&self) -> std::slice::Iter<'_, HandlerEntry> {
        self.entries.iter()
    }

    /// Returns the first entry whose matcher accepts `event`.
    pub fn resolve(&self, event: &InboundEvent) -> Option<&HandlerEntry> {
        let found = self.entries.iter().find(|e| e.matcher.matches(event));
        trace!(
            discriminator = event.discriminator(),
            entry = found.map(HandlerEntry::name),
            "Resolved handler"
        );
        found
    }
}

impl FromIterator<HandlerEntry> for HandlerRegistry {
    fn from_iter<I: IntoIterator<Item = HandlerEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ResponseContext;
    use chime_core::{EventKind, MentionEvent, MessageEvent, SlashCommand};

    async fn noop(_event: InboundEvent, _ctx: ResponseContext) {}

    fn registry() -> HandlerRegistry {
        HandlerRegistry::new()
            .with(HandlerEntry::new("hello", Matcher::command("/hello"), noop))
            .with(HandlerEntry::new(
                "mention",
                Matcher::event(EventKind::AppMention),
                noop,
            ))
            .with(HandlerEntry::new(
                "java",
                Matcher::regex("あなたとJava").unwrap(),
                noop,
            ))
            .with(HandlerEntry::new(
                "any-message",
                Matcher::event(EventKind::Message),
                noop,
            ))
    }

    fn message(text: &str) -> InboundEvent {
        InboundEvent::Message(MessageEvent {
            channel: "C1".into(),
            text: text.into(),
            ts: "1.1".into(),
            user: None,
            subtype: None,
        })
    }

    fn resolved(registry: &HandlerRegistry, event: &InboundEvent) -> Option<String> {
        registry.resolve(event).map(|e| e.name().to_string())
    }

    #[test]
    fn test_first_match_wins() {
        let registry = registry();
        let event = message("prefix あなたとJava suffix");

        // Both "java" and "any-message" accept it; the earlier one wins.
        assert_eq!(resolved(&registry, &event).as_deref(), Some("java"));
        assert_eq!(
            resolved(&registry, &message("hello")).as_deref(),
            Some("any-message")
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let registry = registry();
        let event = message("あなたとJava");
        let first = resolved(&registry, &event);

        for _ in 0..10 {
            assert_eq!(resolved(&registry, &event), first);
        }
    }

    #[test]
    fn test_command_and_mention_routing() {
        let registry = registry();
        let slash = |command: &str| {
            InboundEvent::SlashCommand(SlashCommand {
                command: command.into(),
                channel: "C1".into(),
                text: String::new(),
                user_id: None,
                response_url: None,
                trigger_id: None,
            })
        };
        let hello = slash("/hello");
        let help = slash("/help");
        let mention = InboundEvent::Mention(MentionEvent {
            channel: "C1".into(),
            text: "<@U0> /hello".into(),
            ts: "1.1".into(),
            user: None,
        });

        assert_eq!(resolved(&registry, &hello).as_deref(), Some("hello"));
        assert_eq!(resolved(&registry, &help), None);
        assert_eq!(resolved(&registry, &mention).as_deref(), Some("mention"));
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve(&message("anything")).is_none());
    }

    #[test]
    fn test_collected_registry_uses_iteration_order() {
        let registry: HandlerRegistry = registry().entries().cloned().rev().collect();
        assert_eq!(registry.len(), 4);
        assert_eq!(
            resolved(&registry, &message("あなたとJava")).as_deref(),
            Some("any-message")
        );
    }
}
