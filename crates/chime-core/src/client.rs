//! Platform client trait and related types.
//!
//! This module defines the [`PlatformClient`] trait, the outbound API surface
//! handlers use to act on the platform, and [`ApiCallResult`], the structured
//! outcome every call produces.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

/// Outcome of a single platform API call.
///
/// Calls never fail with a Rust error: transport problems and API-level
/// errors alike are folded into `ok == false` plus a reason string, so
/// handlers can report the result and carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCallResult {
    ok: bool,
    error: Option<String>,
}

impl ApiCallResult {
    /// A successful call.
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    /// A failed call with the platform's (or transport's) reason.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(reason.into()),
        }
    }

    /// Returns whether the call succeeded.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Returns the failure reason, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl fmt::Display for ApiCallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None if self.ok => f.write_str("ok"),
            None => f.write_str("failed"),
            Some(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// The outbound platform API.
///
/// Implemented over HTTP by the transport crate and by recording doubles in
/// tests. Both methods wait for the platform's answer before returning.
///
/// # Example
///
/// ```rust,ignore
/// let result = client.post_message("C0123", "pong").await;
/// if !result.is_ok() {
///     eprintln!("post failed: {}", result.error().unwrap_or_default());
/// }
/// ```
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Posts `text` to `channel`.
    async fn post_message(&self, channel: &str, text: &str) -> ApiCallResult;

    /// Adds the reaction `name` (without surrounding colons) to the message
    /// at `timestamp` in `channel`.
    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> ApiCallResult;
}

/// A shared platform client trait object.
pub type BoxedClient = Arc<dyn PlatformClient>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_reason() {
        let r = ApiCallResult::success();
        assert!(r.is_ok());
        assert_eq!(r.error(), None);
        assert_eq!(r.to_string(), "ok");
    }

    #[test]
    fn test_failure_keeps_reason() {
        let r = ApiCallResult::failure("channel_not_found");
        assert!(!r.is_ok());
        assert_eq!(r.error(), Some("channel_not_found"));
        assert_eq!(r.to_string(), "failed: channel_not_found");
    }
}
