//! Slack Web API client.
//!
//! Implements [`PlatformClient`] over `chat.postMessage` and `reactions.add`
//! with bearer bot-token authentication. Every failure, whether the request
//! never reached Slack or Slack answered `ok: false`, becomes a failed
//! [`ApiCallResult`] carrying the reason.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use chime_core::{ApiCallResult, PlatformClient};

use crate::error::TransportResult;

/// Base URL for the Slack Web API.
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Settings for [`SlackClient`].
#[derive(Clone)]
pub struct SlackClientConfig {
    /// Bot token (`xoxb-...`).
    pub bot_token: String,
    /// Web API base URL, without trailing slash.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SlackClientConfig {
    /// Creates a config for `bot_token` against the public API.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: SLACK_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl std::fmt::Debug for SlackClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClientConfig")
            .field("bot_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Slack API response envelope.
#[derive(Debug, Deserialize)]
struct SlackApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Async client for the Slack Web API methods the bot uses.
#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    bot_token: String,
    api_base: String,
}

impl SlackClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`](crate::TransportError::Client) if
    /// the underlying HTTP client cannot be built.
    pub fn new(config: SlackClientConfig) -> TransportResult<Self> {
        let http = ClientBuilder::new().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            bot_token: config.bot_token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Calls a Web API method with a JSON body.
    async fn call(&self, method: &str, body: Value) -> ApiCallResult {
        let resp = match self
            .http
            .post(format!("{}/{method}", self.api_base))
            .bearer_auth(&self.bot_token)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(method, error = %e, "Slack API request failed");
                return ApiCallResult::failure(format!("request_failed: {e}"));
            }
        };

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return ApiCallResult::failure("rate_limited");
        }

        match resp.json::<SlackApiResponse>().await {
            Ok(api) if api.ok => ApiCallResult::success(),
            Ok(api) => ApiCallResult::failure(api.error.unwrap_or_else(|| "unknown".to_string())),
            Err(e) if !status.is_success() => {
                debug!(method, error = %e, "Non-JSON error response");
                ApiCallResult::failure(format!("http_{}", status.as_u16()))
            }
            Err(e) => ApiCallResult::failure(format!("invalid_response: {e}")),
        }
    }
}

#[async_trait]
impl PlatformClient for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> ApiCallResult {
        debug!(channel, "Posting message");
        self.call("chat.postMessage", json!({ "channel": channel, "text": text }))
            .await
    }

    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> ApiCallResult {
        debug!(channel, timestamp, name, "Adding reaction");
        self.call(
            "reactions.add",
            json!({ "channel": channel, "timestamp": timestamp, "name": name }),
        )
        .await
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::HeaderMap,
        routing::post,
    };

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    /// A fake Web API: `chat.postMessage` succeeds, `reactions.add` reports
    /// `already_reacted`, and a missing bearer token yields `not_authed`.
    async fn fake_api(
        State(seen): State<Seen>,
        Path(method): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        use axum::response::IntoResponse;

        let authed = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer xoxb-test");
        seen.lock().push((method.clone(), body));

        if !authed {
            return Json(json!({"ok": false, "error": "not_authed"})).into_response();
        }
        match method.as_str() {
            "chat.postMessage" => Json(json!({"ok": true, "ts": "1.1"})).into_response(),
            "reactions.add" => {
                Json(json!({"ok": false, "error": "already_reacted"})).into_response()
            }
            _ => StatusCode::TOO_MANY_REQUESTS.into_response(),
        }
    }

    async fn spawn_fake() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/api/{method}", post(fake_api))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/api/"), seen)
    }

    fn client(token: &str, api_base: String) -> SlackClient {
        SlackClient::new(SlackClientConfig {
            bot_token: token.to_string(),
            api_base,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_post_message() {
        let (base, seen) = spawn_fake().await;
        let result = client("xoxb-test", base).post_message("C1", "pong").await;

        assert!(result.is_ok());
        let seen = seen.lock();
        assert_eq!(seen[0].0, "chat.postMessage");
        assert_eq!(seen[0].1, json!({"channel": "C1", "text": "pong"}));
    }

    #[tokio::test]
    async fn test_api_error_becomes_failure() {
        let (base, seen) = spawn_fake().await;
        let result = client("xoxb-test", base)
            .add_reaction("C1", "1.1", "yoshi")
            .await;

        assert_eq!(result.error(), Some("already_reacted"));
        assert_eq!(
            seen.lock()[0].1,
            json!({"channel": "C1", "timestamp": "1.1", "name": "yoshi"})
        );
    }

    #[tokio::test]
    async fn test_bad_token() {
        let (base, _) = spawn_fake().await;
        let result = client("xoxb-wrong", base).post_message("C1", "x").await;
        assert_eq!(result.error(), Some("not_authed"));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let (base, _) = spawn_fake().await;
        let result = client("xoxb-test", base).call("other.method", json!({})).await;
        assert_eq!(result.error(), Some("rate_limited"));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let result = client("xoxb-test", "http://127.0.0.1:1".to_string())
            .post_message("C1", "x")
            .await;

        assert!(!result.is_ok());
        assert!(result.error().unwrap().starts_with("request_failed"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = SlackClientConfig::new("xoxb-secret");
        assert!(!format!("{config:?}").contains("xoxb-secret"));
        assert_eq!(config.api_base, SLACK_API_BASE);
    }
}
