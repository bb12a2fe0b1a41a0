//! Acknowledgment payloads.
//!
//! Every dispatched event is acknowledged exactly once. The acknowledgment
//! either carries nothing or a short message that the platform shows to the
//! invoker (slash commands only).

use serde::Serialize;
use serde_json::Value;

/// Who can see an acknowledgment message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the invoking user.
    Ephemeral,
    /// Everyone in the channel.
    InChannel,
}

/// The payload of an acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AckResponse {
    /// An empty acknowledgment.
    #[default]
    Empty,
    /// An acknowledgment carrying a message.
    Message {
        /// Who sees the message.
        visibility: Visibility,
        /// Message text.
        text: String,
    },
}

#[derive(Serialize)]
struct MessageBody<'a> {
    response_type: Visibility,
    text: &'a str,
}

impl AckResponse {
    /// Creates a message visible to the whole channel.
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self::Message {
            visibility: Visibility::InChannel,
            text: text.into(),
        }
    }

    /// Creates a message visible only to the invoker.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self::Message {
            visibility: Visibility::Ephemeral,
            text: text.into(),
        }
    }

    /// Returns `true` for [`AckResponse::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the JSON response body, or `None` for an empty ack.
    pub fn to_body(&self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Message { visibility, text } => serde_json::to_value(MessageBody {
                response_type: *visibility,
                text,
            })
            .ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_ack_has_no_body() {
        assert!(AckResponse::Empty.to_body().is_none());
        assert!(AckResponse::default().is_empty());
    }

    #[test]
    fn test_in_channel_body() {
        let body = AckResponse::in_channel("hi all").to_body().unwrap();
        assert_eq!(body, json!({"response_type": "in_channel", "text": "hi all"}));
    }

    #[test]
    fn test_ephemeral_body() {
        let body = AckResponse::ephemeral("psst").to_body().unwrap();
        assert_eq!(body["response_type"], "ephemeral");
    }
}
