//! Event system for the Chime framework.
//!
//! This module provides the inbound event model:
//!
//! - [`RawDelivery`] - An undecoded webhook body plus its content type
//! - [`InboundEvent`] - The decoded event, one of three variants
//! - [`EventKind`] - The variant tag, used by event-type matchers
//!
//! # Wire Shapes
//!
//! Slash commands arrive as `application/x-www-form-urlencoded` bodies.
//! Mentions and channel messages arrive as Events API JSON, wrapped in an
//! `event_callback` envelope:
//!
//! ```text
//! { "type": "event_callback",
//!   "event": { "type": "app_mention", "channel": "C1", "text": "<@U0> ping", "ts": "1.2" } }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::DecodeError;

// ============================================================================
// Event Kind
// ============================================================================

/// The variant tag of an [`InboundEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A slash command invocation (`/hello`).
    SlashCommand,
    /// An `app_mention` event.
    AppMention,
    /// A plain `message` event.
    Message,
}

impl EventKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlashCommand => "slash_command",
            Self::AppMention => "app_mention",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slash_command" | "slash_commands" => Ok(Self::SlashCommand),
            "app_mention" => Ok(Self::AppMention),
            "message" => Ok(Self::Message),
            other => Err(DecodeError::UnsupportedEvent(other.to_string())),
        }
    }
}

// ============================================================================
// Event Variants
// ============================================================================

/// A slash command invocation, decoded from the form body Slack posts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlashCommand {
    /// The command name including the leading slash, e.g. `/hello`.
    pub command: String,

    /// Channel the command was invoked in.
    #[serde(rename = "channel_id")]
    pub channel: String,

    /// Everything typed after the command name.
    #[serde(default)]
    pub text: String,

    /// Invoking user.
    #[serde(default)]
    pub user_id: Option<String>,

    /// URL for delayed responses.
    #[serde(default)]
    pub response_url: Option<String>,

    #[serde(default)]
    pub trigger_id: Option<String>,
}

/// An `app_mention` event: someone wrote `@bot ...` in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MentionEvent {
    /// Channel the mention was posted in.
    pub channel: String,

    /// Full message text, including the leading `<@BOTID>` token.
    #[serde(default)]
    pub text: String,

    /// Timestamp of the mentioning message.
    pub ts: String,

    #[serde(default)]
    pub user: Option<String>,
}

/// A `message` event posted in a channel the bot is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    /// Channel the message was posted in.
    pub channel: String,

    /// Message text. Absent for some subtypes (edits, joins), hence the default.
    #[serde(default)]
    pub text: String,

    /// Timestamp of this message, used to target reactions.
    pub ts: String,

    #[serde(default)]
    pub user: Option<String>,

    /// Message subtype (`bot_message`, `channel_join`, ...). Absent for plain
    /// user messages.
    #[serde(default)]
    pub subtype: Option<String>,
}

// ============================================================================
// InboundEvent
// ============================================================================

/// A decoded webhook event.
///
/// Every variant exposes the same four accessors so matchers and handlers can
/// stay variant-agnostic where they want to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A slash command.
    SlashCommand(SlashCommand),
    /// A bot mention.
    Mention(MentionEvent),
    /// A channel message.
    Message(MessageEvent),
}

impl InboundEvent {
    /// Returns the variant tag.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SlashCommand(_) => EventKind::SlashCommand,
            Self::Mention(_) => EventKind::AppMention,
            Self::Message(_) => EventKind::Message,
        }
    }

    /// Returns the source channel identifier.
    pub fn channel(&self) -> &str {
        match self {
            Self::SlashCommand(c) => &c.channel,
            Self::Mention(m) => &m.channel,
            Self::Message(m) => &m.channel,
        }
    }

    /// Returns the message timestamp.
    ///
    /// Slash commands are not messages and carry no timestamp; an empty
    /// string is returned for them.
    pub fn ts(&self) -> &str {
        match self {
            Self::SlashCommand(_) => "",
            Self::Mention(m) => &m.ts,
            Self::Message(m) => &m.ts,
        }
    }

    /// Returns the raw text body, possibly empty.
    pub fn text(&self) -> &str {
        match self {
            Self::SlashCommand(c) => &c.text,
            Self::Mention(m) => &m.text,
            Self::Message(m) => &m.text,
        }
    }

    /// Returns the command name for slash commands, or the event type name
    /// for Events API events.
    pub fn discriminator(&self) -> &str {
        match self {
            Self::SlashCommand(c) => &c.command,
            Self::Mention(_) => EventKind::AppMention.as_str(),
            Self::Message(_) => EventKind::Message.as_str(),
        }
    }
}

// ============================================================================
// RawDelivery
// ============================================================================

/// Events API envelope, tagged by its `type` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    EventCallback { event: EventPayload },
    UrlVerification { challenge: String },
    #[serde(other)]
    Other,
}

/// The inner event of an `event_callback` envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventPayload {
    AppMention(MentionEvent),
    Message(MessageEvent),
    #[serde(other)]
    Unsupported,
}

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// One undecoded webhook delivery.
#[derive(Debug, Clone)]
pub struct RawDelivery {
    content_type: Option<String>,
    body: Vec<u8>,
}

impl RawDelivery {
    /// Creates a delivery from its `Content-Type` header value and body.
    pub fn new(content_type: Option<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type,
            body: body.into(),
        }
    }

    /// Creates a JSON delivery.
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::new(Some(JSON_CONTENT_TYPE.to_string()), body)
    }

    /// Creates a form-encoded delivery.
    pub fn form(body: impl Into<Vec<u8>>) -> Self {
        Self::new(Some(FORM_CONTENT_TYPE.to_string()), body)
    }

    fn is_form(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE))
    }

    /// Returns the challenge if this is an Events API `url_verification`
    /// handshake rather than an event.
    pub fn url_verification_challenge(&self) -> Option<String> {
        if self.is_form() {
            return None;
        }
        match serde_json::from_slice::<Envelope>(&self.body) {
            Ok(Envelope::UrlVerification { challenge }) => Some(challenge),
            _ => None,
        }
    }

    /// Decodes this delivery into an [`InboundEvent`].
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for malformed bodies, unknown content types,
    /// and envelopes or event types that are not one of the three supported
    /// variants.
    pub fn decode(&self) -> Result<InboundEvent, DecodeError> {
        if self.is_form() {
            let command: SlashCommand = serde_urlencoded::from_bytes(&self.body)?;
            return Ok(InboundEvent::SlashCommand(command));
        }

        match self.content_type.as_deref() {
            None => {}
            Some(ct) if ct.starts_with(JSON_CONTENT_TYPE) => {}
            Some(other) => return Err(DecodeError::UnsupportedContentType(other.to_string())),
        }

        match serde_json::from_slice::<Envelope>(&self.body)? {
            Envelope::EventCallback { event } => match event {
                EventPayload::AppMention(m) => Ok(InboundEvent::Mention(m)),
                EventPayload::Message(m) => Ok(InboundEvent::Message(m)),
                EventPayload::Unsupported => {
                    Err(DecodeError::UnsupportedEvent(event_type_of(&self.body)))
                }
            },
            Envelope::UrlVerification { .. } => Err(DecodeError::UrlVerification),
            Envelope::Other => Err(DecodeError::UnsupportedEnvelope),
        }
    }
}

/// Best-effort extraction of `event.type` for error messages.
fn event_type_of(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("event")
                .and_then(|e| e.get("type"))
                .and_then(|t| t.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_slash_command_form() {
        let raw = RawDelivery::form(
            "token=x&command=%2Fhello&channel_id=C1&text=&user_id=U1&trigger_id=t1",
        );
        let event = raw.decode().unwrap();

        assert_eq!(event.kind(), EventKind::SlashCommand);
        assert_eq!(event.discriminator(), "/hello");
        assert_eq!(event.channel(), "C1");
        assert_eq!(event.ts(), "");
        assert_eq!(event.text(), "");
    }

    #[test]
    fn test_decode_app_mention() {
        let raw = RawDelivery::json(
            r#"{"type":"event_callback","event_id":"Ev1","event":{"type":"app_mention","user":"U1","text":"<@U0> ping","ts":"1700000000.000100","channel":"C1"}}"#,
        );
        let event = raw.decode().unwrap();

        assert_eq!(event.kind(), EventKind::AppMention);
        assert_eq!(event.discriminator(), "app_mention");
        assert_eq!(event.text(), "<@U0> ping");
        assert_eq!(event.ts(), "1700000000.000100");
    }

    #[test]
    fn test_decode_message_without_text() {
        let raw = RawDelivery::json(
            r#"{"type":"event_callback","event":{"type":"message","subtype":"channel_join","ts":"1.2","channel":"C9"}}"#,
        );
        let InboundEvent::Message(msg) = raw.decode().unwrap() else {
            panic!("expected message event");
        };

        assert_eq!(msg.text, "");
        assert_eq!(msg.subtype.as_deref(), Some("channel_join"));
    }

    #[test]
    fn test_decode_rejects_unsupported_event() {
        let raw = RawDelivery::json(
            r#"{"type":"event_callback","event":{"type":"reaction_added","ts":"1.2"}}"#,
        );
        let err = raw.decode().unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedEvent(ref t) if t == "reaction_added"));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let raw = RawDelivery::json("{not json");
        assert!(matches!(raw.decode(), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_rejects_form_without_command() {
        let raw = RawDelivery::form("channel_id=C1&text=hi");
        assert!(matches!(raw.decode(), Err(DecodeError::Form(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_content_type() {
        let raw = RawDelivery::new(Some("text/plain".into()), "hello");
        assert!(matches!(
            raw.decode(),
            Err(DecodeError::UnsupportedContentType(_))
        ));
    }

    #[test]
    fn test_url_verification_challenge() {
        let raw = RawDelivery::json(r#"{"type":"url_verification","challenge":"abc123"}"#);
        assert_eq!(raw.url_verification_challenge().as_deref(), Some("abc123"));
        assert!(matches!(raw.decode(), Err(DecodeError::UrlVerification)));

        let event = RawDelivery::json(
            r#"{"type":"event_callback","event":{"type":"message","text":"x","ts":"1","channel":"C"}}"#,
        );
        assert!(event.url_verification_challenge().is_none());
    }

    #[test]
    fn test_event_kind_from_str() {
        assert_eq!("app_mention".parse::<EventKind>().unwrap(), EventKind::AppMention);
        assert_eq!("message".parse::<EventKind>().unwrap(), EventKind::Message);
        assert!("reaction_added".parse::<EventKind>().is_err());
    }
}
