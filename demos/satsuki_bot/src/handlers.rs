//! The bot's handlers, in the order they are registered.

use chime::prelude::*;
use tracing::debug;

/// Pattern the message handler reacts to.
pub const JAVA_PATTERN: &str = "あなたとJava";

const HELLO_TEXT: &str = "呼ばれたのでチャンネルの参加者全員に見えるメッセージを送っています";
const JAVA_REPLY: &str = "いますぐダウンロー\nド";
const JAVA_REACTION: &str = "yoshi";

const PONG: &str = "pong";
const NARUHODO_REPLY: &str = "気づいたんや…";
const FALLBACK_REPLY: &str = "ちょっと何言ってるかわからないですね（CV.サンド富澤）";

/// Builds the handler entries, most specific first.
pub fn entries() -> anyhow::Result<Vec<HandlerEntry>> {
    Ok(vec![
        on_command("/hello").name("hello").handler(hello),
        on_event(EventKind::AppMention).name("mention").handler(mention),
        on_message_matching(JAVA_PATTERN)?
            .name("java")
            .handler(java_message),
    ])
}

/// `/hello`: answers in the channel through the acknowledgment itself.
pub async fn hello(_event: InboundEvent, _ctx: ResponseContext) -> AckResponse {
    AckResponse::in_channel(HELLO_TEXT)
}

/// Picks the reply for the word following the mention.
pub fn reply_for(token: Option<&str>) -> &'static str {
    match token {
        Some("ping") => PONG,
        Some("なるほど") => NARUHODO_REPLY,
        _ => FALLBACK_REPLY,
    }
}

/// `@bot <word>`: replies in the channel, then acknowledges.
pub async fn mention(event: InboundEvent, ctx: ResponseContext) -> AckResponse {
    let token = event.text().split(' ').nth(1);
    if token.is_none() {
        debug!(text = event.text(), "Mention without a word after it");
    }

    ctx.post_message(event.channel(), reply_for(token)).await;
    AckResponse::Empty
}

/// Messages containing the slogan: react, answer, then acknowledge.
///
/// A failed reaction is reported and the reply is still posted.
pub async fn java_message(event: InboundEvent, ctx: ResponseContext) -> AckResponse {
    ctx.add_reaction(event.channel(), event.ts(), JAVA_REACTION).await;
    ctx.post_message(event.channel(), JAVA_REPLY).await;
    AckResponse::Empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chime::core::RawDelivery;
    use chime::framework::{DispatchOutcome, Dispatcher};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<String>>,
        fail_reactions: bool,
    }

    #[async_trait]
    impl PlatformClient for RecordingClient {
        async fn post_message(&self, channel: &str, text: &str) -> ApiCallResult {
            self.calls.lock().push(format!("post {channel} {text}"));
            ApiCallResult::success()
        }

        async fn add_reaction(&self, channel: &str, ts: &str, name: &str) -> ApiCallResult {
            self.calls.lock().push(format!("react {channel} {ts} {name}"));
            if self.fail_reactions {
                ApiCallResult::failure("already_reacted")
            } else {
                ApiCallResult::success()
            }
        }
    }

    fn dispatcher(client: Arc<RecordingClient>) -> Dispatcher {
        let registry = entries().unwrap().into_iter().collect();
        Dispatcher::new(registry, client)
    }

    fn event_json(kind: &str, text: &str) -> RawDelivery {
        let body = format!(
            r#"{{"type":"event_callback","event":{{"type":"{kind}","text":"{text}","ts":"1700000000.000100","channel":"C42"}}}}"#
        );
        RawDelivery::json(body)
    }

    /// Runs the dispatched handler to completion and returns its name and ack.
    async fn run(outcome: DispatchOutcome) -> (String, Option<AckResponse>) {
        let dispatched = match outcome {
            DispatchOutcome::Dispatched(d) => d,
            other => panic!("expected a dispatched handler, got {other:?}"),
        };
        let ack = tokio::time::timeout(Duration::from_secs(1), dispatched.ack.wait())
            .await
            .unwrap();
        dispatched.task.await.unwrap();
        (dispatched.handler, ack)
    }

    #[test]
    fn test_reply_table() {
        let cases = [
            (Some("ping"), PONG),
            (Some("なるほど"), NARUHODO_REPLY),
            (Some("pong"), FALLBACK_REPLY),
            (Some(""), FALLBACK_REPLY),
            (None, FALLBACK_REPLY),
        ];
        for (token, expected) in cases {
            assert_eq!(reply_for(token), expected, "token {token:?}");
        }
    }

    #[test]
    fn test_registration_order() {
        let names: Vec<String> = entries()
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, ["hello", "mention", "java"]);
    }

    #[tokio::test]
    async fn test_hello_acks_in_channel() {
        let client = Arc::new(RecordingClient::default());
        let raw = RawDelivery::form("command=%2Fhello&channel_id=C42&text=&user_id=U1");

        let (handler, ack) = run(dispatcher(client.clone()).dispatch(&raw)).await;

        assert_eq!(handler, "hello");
        assert_eq!(ack, Some(AckResponse::in_channel(HELLO_TEXT)));
        assert!(client.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_mention_ping_posts_pong() {
        let client = Arc::new(RecordingClient::default());
        let raw = event_json("app_mention", "<@U0BOT> ping");

        let (handler, ack) = run(dispatcher(client.clone()).dispatch(&raw)).await;

        assert_eq!(handler, "mention");
        assert_eq!(ack, Some(AckResponse::Empty));
        assert_eq!(*client.calls.lock(), vec!["post C42 pong".to_string()]);
    }

    #[tokio::test]
    async fn test_bare_mention_gets_fallback() {
        let client = Arc::new(RecordingClient::default());
        let raw = event_json("app_mention", "<@U0BOT>");

        let (_, ack) = run(dispatcher(client.clone()).dispatch(&raw)).await;

        assert_eq!(ack, Some(AckResponse::Empty));
        assert_eq!(
            *client.calls.lock(),
            vec![format!("post C42 {FALLBACK_REPLY}")]
        );
    }

    #[tokio::test]
    async fn test_java_reacts_then_posts() {
        let client = Arc::new(RecordingClient::default());
        let raw = event_json("message", "prefix あなたとJava suffix");

        let (handler, ack) = run(dispatcher(client.clone()).dispatch(&raw)).await;

        assert_eq!(handler, "java");
        assert_eq!(ack, Some(AckResponse::Empty));
        assert_eq!(
            *client.calls.lock(),
            vec![
                "react C42 1700000000.000100 yoshi".to_string(),
                format!("post C42 {JAVA_REPLY}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_reaction_still_posts() {
        let client = Arc::new(RecordingClient {
            fail_reactions: true,
            ..Default::default()
        });
        let raw = event_json("message", "あなたとJava");

        let (_, ack) = run(dispatcher(client.clone()).dispatch(&raw)).await;

        assert_eq!(ack, Some(AckResponse::Empty));
        assert_eq!(client.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_unrelated_message_is_unmatched() {
        let client = Arc::new(RecordingClient::default());
        let raw = event_json("message", "just chatting");

        let outcome = dispatcher(client.clone()).dispatch(&raw);

        assert!(matches!(outcome, DispatchOutcome::Unmatched));
        assert!(client.calls.lock().is_empty());
    }
}
