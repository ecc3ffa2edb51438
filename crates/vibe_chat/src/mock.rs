//! Scripted text provider for testing.
//!
//! Replays queued replies as fragment streams so agents, the orchestrator and
//! sessions can be exercised without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{ChatError, ChatResult};
use crate::provider::{fragments_stream, TextProvider, TextStream};
use crate::types::CompletionRequest;

/// Predefined reply for one `stream` call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Fragments delivered in order
    Fragments(Vec<String>),
    /// Fragments delivered before the stream fails
    FailAfter(Vec<String>, String),
    /// The call fails before streaming starts
    Reject(String),
}

impl ScriptedReply {
    /// Whole reply delivered as a single fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Fragments(vec![text.into()])
    }

    /// Reply split into fragments of at most `size` chars.
    pub fn chunked(text: &str, size: usize) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self::Fragments(
            chars
                .chunks(size.max(1))
                .map(|chunk| chunk.iter().collect())
                .collect(),
        )
    }
}

/// Text provider that replays scripted replies.
///
/// Replies are consumed in order. Once the queue is exhausted, every further
/// call receives the fallback reply, an empty string unless configured.
#[derive(Clone)]
pub struct ScriptedProvider {
    /// Queued replies.
    replies: Arc<RwLock<Vec<ScriptedReply>>>,
    /// Index of next reply to return.
    reply_index: Arc<AtomicUsize>,
    /// Reply used when the queue is exhausted.
    fallback: Arc<RwLock<ScriptedReply>>,
    /// Captured requests for verification.
    captured: Arc<RwLock<Vec<CompletionRequest>>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    /// Create a provider with an empty queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(RwLock::new(Vec::new())),
            reply_index: Arc::new(AtomicUsize::new(0)),
            fallback: Arc::new(RwLock::new(ScriptedReply::text(""))),
            captured: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a reply for the next call.
    pub fn add_reply(self, reply: ScriptedReply) -> Self {
        self.replies.write().push(reply);
        self
    }

    /// Queue a plain text reply for the next call.
    pub fn add_text(self, text: impl Into<String>) -> Self {
        self.add_reply(ScriptedReply::text(text))
    }

    /// Reply used once the queue is exhausted.
    pub fn with_fallback(self, reply: ScriptedReply) -> Self {
        *self.fallback.write() = reply;
        self
    }

    /// Get all captured requests.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.captured.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured.read().len()
    }

    fn next_reply(&self) -> ScriptedReply {
        let index = self.reply_index.fetch_add(1, Ordering::SeqCst);
        self.replies
            .read()
            .get(index)
            .cloned()
            .unwrap_or_else(|| self.fallback.read().clone())
    }
}

#[async_trait]
impl TextProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn stream(&self, request: CompletionRequest) -> ChatResult<TextStream> {
        self.captured.write().push(request);

        match self.next_reply() {
            ScriptedReply::Fragments(fragments) => {
                Ok(fragments_stream(fragments.into_iter().map(Ok).collect::<Vec<_>>()))
            }
            ScriptedReply::FailAfter(fragments, message) => {
                let items: Vec<ChatResult<String>> = fragments
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(ChatError::StreamInterrupted(message))))
                    .collect();
                Ok(fragments_stream(items))
            }
            ScriptedReply::Reject(message) => Err(ChatError::LlmError(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::collect_text;

    #[tokio::test]
    async fn test_replies_in_order_then_fallback() {
        let provider = ScriptedProvider::new()
            .add_text("first")
            .add_reply(ScriptedReply::chunked("second", 2))
            .with_fallback(ScriptedReply::text("again"));

        for expected in ["first", "second", "again", "again"] {
            let stream = provider
                .stream(CompletionRequest::single_turn("go"))
                .await
                .unwrap();
            assert_eq!(collect_text(stream).await.unwrap(), expected);
        }
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_captures_requests() {
        let provider = ScriptedProvider::new();
        let _ = provider
            .stream(CompletionRequest::single_turn("hello").with_system("sys"))
            .await;

        let requests = provider.requests();
        assert_eq!(requests[0].system.as_deref(), Some("sys"));
        assert_eq!(requests[0].last_user_content(), Some("hello"));
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let provider = ScriptedProvider::new()
            .add_reply(ScriptedReply::Reject("quota".to_string()))
            .add_reply(ScriptedReply::FailAfter(
                vec!["par".to_string()],
                "reset".to_string(),
            ));

        let rejected = provider.stream(CompletionRequest::single_turn("a")).await;
        assert!(matches!(rejected, Err(ChatError::LlmError(_))));

        let stream = provider
            .stream(CompletionRequest::single_turn("b"))
            .await
            .unwrap();
        let err = collect_text(stream).await.unwrap_err();
        assert!(matches!(err, ChatError::StreamInterrupted(_)));
    }

    #[test]
    fn test_chunked_keeps_text() {
        let ScriptedReply::Fragments(parts) = ScriptedReply::chunked("h\u{e9}llo", 2) else {
            panic!("expected fragments");
        };
        assert_eq!(parts, vec!["h\u{e9}", "ll", "o"]);
    }
}
