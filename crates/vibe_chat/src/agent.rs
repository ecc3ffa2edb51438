//! A role-bound agent performing one request/response cycle per call.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use vibe_core::AgentRole;

use crate::error::{ChatError, ChatResult};
use crate::prompts::system_prompt;
use crate::provider::TextProvider;
use crate::types::{AgentRunRecord, CompletionRequest};

/// An agent with a fixed role and instruction.
///
/// Every successful [`Agent::run`] appends one [`AgentRunRecord`] to the
/// agent's own log. Failures are returned to the caller as-is.
pub struct Agent {
    role: AgentRole,
    instruction: String,
    provider: Arc<dyn TextProvider>,
    records: Vec<AgentRunRecord>,
}

impl Agent {
    /// Create an agent using the built-in instruction for `role`.
    pub fn new(role: AgentRole, provider: Arc<dyn TextProvider>) -> Self {
        Self::with_instruction(role, system_prompt(role), provider)
    }

    /// Create an agent with a custom instruction.
    pub fn with_instruction(
        role: AgentRole,
        instruction: impl Into<String>,
        provider: Arc<dyn TextProvider>,
    ) -> Self {
        Self {
            role,
            instruction: instruction.into(),
            provider,
            records: Vec::new(),
        }
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Run log, oldest first.
    pub fn records(&self) -> &[AgentRunRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AgentRunRecord> {
        self.records
    }

    /// Build the single-turn prompt for a task.
    pub fn compose_prompt(&self, task: &str, context: Option<&str>) -> String {
        let mut prompt = format!("{}\n\n---\n\nTask: {}", self.instruction, task);
        if let Some(context) = context {
            prompt.push_str("\n\nContext:\n");
            prompt.push_str(context);
        }
        prompt
    }

    /// Run a task and return the complete reply.
    ///
    /// `cancel` is checked while waiting for the provider and between
    /// fragments.
    pub async fn run(
        &mut self,
        task: &str,
        context: Option<&str>,
        cancel: &CancellationToken,
    ) -> ChatResult<String> {
        if cancel.is_cancelled() {
            return Err(ChatError::Cancelled);
        }

        let request = CompletionRequest::single_turn(self.compose_prompt(task, context));
        tracing::debug!(role = %self.role, provider = self.provider.name(), "agent call started");

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChatError::Cancelled),
            result = self.provider.stream(request) => result?,
        };

        let mut output = String::new();
        let mut fragments = 0usize;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ChatError::Cancelled),
                next = stream.next() => next,
            };
            match next {
                Some(fragment) => {
                    output.push_str(&fragment?);
                    fragments += 1;
                }
                None => break,
            }
        }

        tracing::debug!(
            role = %self.role,
            fragments,
            chars = output.len(),
            "agent call completed"
        );

        self.records.push(AgentRunRecord {
            role: self.role,
            content: output.clone(),
            timestamp: Utc::now(),
        });
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{fragments_stream, MockTextProvider};

    fn mock_replying(fragments: &'static [&'static str]) -> MockTextProvider {
        let mut provider = MockTextProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_stream().returning(move |_| {
            Ok(fragments_stream(
                fragments.iter().map(|f| Ok(f.to_string())).collect::<Vec<_>>(),
            ))
        });
        provider
    }

    #[test]
    fn test_compose_prompt() {
        let agent = Agent::with_instruction(
            AgentRole::Architect,
            "You design things.",
            Arc::new(MockTextProvider::new()),
        );
        assert_eq!(
            agent.compose_prompt("plan a blog", None),
            "You design things.\n\n---\n\nTask: plan a blog"
        );
        assert_eq!(
            agent.compose_prompt("plan a blog", Some("dark theme")),
            "You design things.\n\n---\n\nTask: plan a blog\n\nContext:\ndark theme"
        );
    }

    #[tokio::test]
    async fn test_run_drains_fragments_and_records() {
        let mut agent = Agent::new(
            AgentRole::Frontend,
            Arc::new(mock_replying(&["<div>", "hi", "</div>"])),
        );

        let output = agent
            .run("build", None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output, "<div>hi</div>");
        assert_eq!(agent.records().len(), 1);
        assert_eq!(agent.records()[0].role, AgentRole::Frontend);
        assert_eq!(agent.records()[0].content, output);
    }

    #[tokio::test]
    async fn test_run_sends_single_turn_with_instruction() {
        let mut provider = MockTextProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_stream()
            .withf(|request| {
                request.system.is_none()
                    && request.messages.len() == 1
                    && request
                        .last_user_content()
                        .map_or(false, |c| c.starts_with("Be kind.") && c.ends_with("Task: greet"))
            })
            .times(1)
            .returning(|_| Ok(fragments_stream(vec![Ok("hello".to_string())])));

        let mut agent = Agent::with_instruction(AgentRole::Reviewer, "Be kind.", Arc::new(provider));
        agent.run("greet", None, &CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_retried_or_recorded() {
        let mut provider = MockTextProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_stream()
            .times(1)
            .returning(|_| Err(ChatError::LlmError("unauthorized".to_string())));

        let mut agent = Agent::new(AgentRole::Backend, Arc::new(provider));
        let result = agent.run("logic", None, &CancellationToken::new()).await;

        assert!(matches!(result, Err(ChatError::LlmError(_))));
        assert!(agent.records().is_empty());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_propagates() {
        let mut provider = MockTextProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_stream().returning(|_| {
            Ok(fragments_stream(vec![
                Ok("partial".to_string()),
                Err(ChatError::StreamInterrupted("reset".to_string())),
            ]))
        });

        let mut agent = Agent::new(AgentRole::Frontend, Arc::new(provider));
        let result = agent.run("build", None, &CancellationToken::new()).await;

        assert!(matches!(result, Err(ChatError::StreamInterrupted(_))));
        assert!(agent.records().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mut provider = MockTextProvider::new();
        provider.expect_stream().never();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut agent = Agent::new(AgentRole::Coordinator, Arc::new(provider));
        let result = agent.run("plan", None, &cancel).await;
        assert!(matches!(result, Err(ChatError::Cancelled)));
    }

    #[test]
    fn test_instruction_is_fixed_per_role() {
        let agent = Agent::new(AgentRole::Reviewer, Arc::new(MockTextProvider::new()));
        assert_eq!(agent.instruction(), system_prompt(AgentRole::Reviewer));
        assert_eq!(agent.role(), AgentRole::Reviewer);
    }
}
