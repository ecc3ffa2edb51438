//! Single-agent generation session.
//!
//! A session keeps the conversation with one agent and the project it has
//! produced so far. Every streamed fragment re-runs the extractor over the
//! reply accumulated so far, so callers see the project grow while the
//! reply is still arriving.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vibe_core::{extract, render, FileSet};

use crate::error::{ChatError, ChatResult};
use crate::prompts::SESSION_INSTRUCTION;
use crate::provider::TextProvider;
use crate::types::{CompletionRequest, Message};

/// Progress reported while a reply streams in.
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent<'a> {
    /// A new fragment of the reply
    Fragment(&'a str),
    /// The extracted project changed
    Files(&'a FileSet),
}

/// Result of one [`GenerationSession::send`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReply {
    /// Reply text received, complete unless cancelled
    pub text: String,
    /// Whether this reply replaced the project
    pub files_changed: bool,
    /// Whether the caller stopped the reply early
    pub cancelled: bool,
}

/// Caller-owned conversation with a single generating agent.
pub struct GenerationSession {
    provider: Arc<dyn TextProvider>,
    instruction: String,
    history: Vec<Message>,
    files: FileSet,
}

impl GenerationSession {
    /// Create a session with the built-in instruction.
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self::with_instruction(provider, SESSION_INSTRUCTION)
    }

    pub fn with_instruction(provider: Arc<dyn TextProvider>, instruction: impl Into<String>) -> Self {
        Self {
            provider,
            instruction: instruction.into(),
            history: Vec::new(),
            files: FileSet::new(),
        }
    }

    /// Start from an existing project, e.g. one loaded from the store.
    pub fn with_files(mut self, files: FileSet) -> Self {
        self.files = files;
        self
    }

    /// Conversation so far, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Latest valid project.
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Clear history and files.
    pub fn reset(&mut self) {
        self.history.clear();
        self.files = FileSet::new();
    }

    /// Instruction sent with the next request, followed by the current
    /// project when there is one.
    fn system_text(&self) -> String {
        if self.files.is_empty() {
            return self.instruction.clone();
        }
        format!(
            "{}\n\nCurrent project files:\n\n{}",
            self.instruction,
            render(&self.files)
        )
    }

    /// Send a prompt and stream the reply.
    ///
    /// The current project is sent along with the instruction so the agent
    /// can edit it. `on_update` receives every fragment and every change of
    /// the project. When extraction finds nothing the previous project is
    /// kept.
    ///
    /// On cancellation the partial reply is kept in the history and returned
    /// with `cancelled` set; a reply cancelled before any text arrived leaves
    /// the history as it was. On provider failure the session is left as it
    /// was before the call.
    pub async fn send<F>(
        &mut self,
        prompt: &str,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> ChatResult<SessionReply>
    where
        F: FnMut(SessionEvent<'_>),
    {
        let previous_files = self.files.clone();
        self.history.push(Message::user(prompt));

        let request = CompletionRequest {
            system: Some(self.system_text()),
            messages: self.history.clone(),
        };

        match self.stream_reply(request, cancel, &mut on_update).await {
            Ok((text, cancelled)) => {
                let files_changed = self.files != previous_files;
                if cancelled {
                    info!("Generation cancelled after {} chars", text.len());
                }
                if text.is_empty() {
                    self.history.pop();
                } else {
                    self.history.push(Message::assistant(text.clone()));
                }
                Ok(SessionReply {
                    text,
                    files_changed,
                    cancelled,
                })
            }
            Err(e) => {
                self.history.pop();
                self.files = previous_files;
                Err(e)
            }
        }
    }

    async fn stream_reply<F>(
        &mut self,
        request: CompletionRequest,
        cancel: &CancellationToken,
        on_update: &mut F,
    ) -> ChatResult<(String, bool)>
    where
        F: FnMut(SessionEvent<'_>),
    {
        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok((String::new(), true)),
            result = self.provider.stream(request) => result?,
        };

        let mut buffer = String::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok((buffer, true)),
                next = stream.next() => next,
            };
            let fragment = match next {
                Some(fragment) => fragment?,
                None => break,
            };
            if fragment.is_empty() {
                continue;
            }

            buffer.push_str(&fragment);
            on_update(SessionEvent::Fragment(&fragment));

            match extract(&buffer) {
                Some(files) if files != self.files => {
                    debug!("Project updated: {} files", files.len());
                    self.files = files;
                    on_update(SessionEvent::Files(&self.files));
                }
                Some(_) => {}
                None => debug!("No files in reply yet, keeping previous project"),
            }
        }

        if buffer.trim().is_empty() {
            return Err(ChatError::LlmError("Empty reply from provider".to_string()));
        }
        Ok((buffer, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ScriptedProvider, ScriptedReply};
    use crate::types::MessageRole;
    use vibe_core::ENTRY_POINT;

    #[tokio::test]
    async fn test_files_grow_with_fragments() {
        let reply = "Here you go!\n```html\n<!DOCTYPE html>\n<p>hi</p>\n```";
        let provider = ScriptedProvider::new().add_reply(ScriptedReply::chunked(reply, 6));
        let mut session = GenerationSession::new(Arc::new(provider));

        let mut snapshots = Vec::new();
        let result = session
            .send("make a page", &CancellationToken::new(), |event| {
                if let SessionEvent::Files(files) = event {
                    snapshots.push(files.get(ENTRY_POINT).unwrap().content.clone());
                }
            })
            .await
            .unwrap();

        assert!(result.files_changed);
        assert!(!result.cancelled);
        assert!(snapshots.len() > 1);
        for pair in snapshots.windows(2) {
            assert!(pair[1].starts_with(pair[0].as_str()));
        }
        assert_eq!(
            session.files().get(ENTRY_POINT).unwrap().content,
            "<!DOCTYPE html>\n<p>hi</p>"
        );
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_reply_without_code_keeps_previous_files() {
        let provider = ScriptedProvider::new()
            .add_text("```html\n<p>v1</p>\n```")
            .add_text("Sure, what color would you like?");
        let mut session = GenerationSession::new(Arc::new(provider));
        let cancel = CancellationToken::new();

        session.send("page", &cancel, |_| {}).await.unwrap();
        let reply = session.send("recolor it", &cancel, |_| {}).await.unwrap();

        assert!(!reply.files_changed);
        assert_eq!(session.files().get(ENTRY_POINT).unwrap().content, "<p>v1</p>");
        assert_eq!(session.history().len(), 4);
    }

    #[tokio::test]
    async fn test_history_is_sent_with_instruction() {
        let provider = ScriptedProvider::new().with_fallback(ScriptedReply::text("ok"));
        let mut session = GenerationSession::with_instruction(Arc::new(provider.clone()), "be terse");
        let cancel = CancellationToken::new();

        session.send("one", &cancel, |_| {}).await.unwrap();
        session.send("two", &cancel, |_| {}).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests[1].system.as_deref(), Some("be terse"));
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(requests[1].last_user_content(), Some("two"));
    }

    #[tokio::test]
    async fn test_failure_restores_session() {
        let provider = ScriptedProvider::new()
            .add_text("```html\n<p>v1</p>\n```")
            .add_reply(ScriptedReply::FailAfter(
                vec!["```html\n<p>v2".to_string()],
                "connection reset".to_string(),
            ));
        let mut session = GenerationSession::new(Arc::new(provider));
        let cancel = CancellationToken::new();

        session.send("page", &cancel, |_| {}).await.unwrap();
        let err = session.send("change", &cancel, |_| {}).await.unwrap_err();

        assert!(matches!(err, ChatError::StreamInterrupted(_)));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.files().get(ENTRY_POINT).unwrap().content, "<p>v1</p>");
    }

    #[tokio::test]
    async fn test_cancel_keeps_partial_reply() {
        let provider = ScriptedProvider::new().add_reply(ScriptedReply::Fragments(vec![
            "```html\n<p>part".to_string(),
            "ial</p>\n```".to_string(),
        ]));
        let mut session = GenerationSession::new(Arc::new(provider));
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        let reply = session
            .send("page", &cancel, move |event| {
                if let SessionEvent::Fragment(_) = event {
                    token.cancel();
                }
            })
            .await
            .unwrap();

        assert!(reply.cancelled);
        assert_eq!(reply.text, "```html\n<p>part");
        assert_eq!(session.files().get(ENTRY_POINT).unwrap().content, "<p>part");
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_before_reply_leaves_history_untouched() {
        let provider = ScriptedProvider::new().with_fallback(ScriptedReply::text("ok"));
        let mut session = GenerationSession::new(Arc::new(provider.clone()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let reply = session.send("page", &cancel, |_| {}).await.unwrap();

        assert!(reply.cancelled);
        assert!(reply.text.is_empty());
        assert!(session.history().is_empty());

        session.send("page", &CancellationToken::new(), |_| {}).await.unwrap();
        let messages = &provider.requests()[0].messages;
        assert_eq!(messages.len(), 1);
        assert!(messages.iter().all(|m| !m.content.is_empty()));
    }

    #[tokio::test]
    async fn test_existing_project_is_sent_to_provider() {
        let files = FileSet::new().with_file("src/App.jsx", "export default App;").unwrap();
        let provider = ScriptedProvider::new().with_fallback(ScriptedReply::text("Which color?"));
        let mut session = GenerationSession::with_instruction(Arc::new(provider.clone()), "be terse")
            .with_files(files.clone());

        session.send("make it blue", &CancellationToken::new(), |_| {}).await.unwrap();

        let system = provider.requests()[0].system.clone().unwrap();
        assert!(system.starts_with("be terse"));
        assert!(system.contains("FILE-BOUNDARY: src/App.jsx"));
        assert!(system.contains("export default App;"));
        assert_eq!(session.files(), &files);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let provider = ScriptedProvider::new().add_text("```html\n<p>x</p>\n```");
        let mut session = GenerationSession::new(Arc::new(provider));
        session.send("x", &CancellationToken::new(), |_| {}).await.unwrap();

        session.reset();
        assert!(session.history().is_empty());
        assert!(session.files().is_empty());
    }
}
