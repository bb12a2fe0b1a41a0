//! Error types for the Chime core.

use thiserror::Error;

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors that can occur while decoding a [`RawDelivery`](crate::RawDelivery).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The form body is not a valid slash command.
    #[error("malformed slash command form: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// The JSON body is not a valid Events API envelope.
    #[error("malformed event payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The delivery's content type is neither form nor JSON.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// The envelope type is not `event_callback`.
    #[error("unsupported envelope type")]
    UnsupportedEnvelope,

    /// The inner event type is not one the bot handles.
    #[error("unsupported event type '{0}'")]
    UnsupportedEvent(String),

    /// The delivery is a `url_verification` handshake, which the transport
    /// answers directly.
    #[error("url_verification handshake is not an event")]
    UrlVerification,
}

// =============================================================================
// Ack Errors
// =============================================================================

/// Errors returned by acknowledgment calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AckError {
    /// `ack` was already called for this event.
    #[error("event already acknowledged")]
    AlreadyAcknowledged,

    /// Nobody is waiting for the acknowledgment any more, typically because
    /// the transport gave up after the response budget elapsed.
    #[error("acknowledgment receiver dropped")]
    ReceiverDropped,
}
