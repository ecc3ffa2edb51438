//! Streaming LLM adapter.
//!
//! Talks to OpenAI-compatible, Anthropic and Gemini endpoints over
//! server-sent events and exposes each as a [`TextProvider`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::config::{LlmSettings, ProviderKind};
use crate::error::{ChatError, ChatResult};
use crate::provider::{TextProvider, TextStream};
use crate::sse::SseDecoder;
use crate::types::{CompletionRequest, MessageRole};

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// LLM adapter that opens streaming completions
pub struct LlmAdapter {
    settings: LlmSettings,
    client: reqwest::Client,
}

impl LlmAdapter {
    /// Create a new LLM adapter with explicit settings
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// Create an LLM adapter from environment variables
    pub fn from_env() -> ChatResult<Self> {
        Ok(Self::new(LlmSettings::from_env()?))
    }

    /// Create an LLM adapter from workspace settings and the environment
    pub fn from_workspace(workspace_root: &Path) -> ChatResult<Self> {
        Ok(Self::new(LlmSettings::from_workspace(workspace_root)?))
    }

    /// Get the current provider
    pub fn provider(&self) -> ProviderKind {
        self.settings.provider
    }

    /// Get the current model
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Send the request once and check the status.
    async fn open(&self, request: &CompletionRequest) -> ChatResult<reqwest::Response> {
        let settings = &self.settings;
        let builder = match settings.provider {
            ProviderKind::OpenAI => self
                .client
                .post(format!("{}/chat/completions", settings.base_url))
                .bearer_auth(&settings.api_key)
                .json(&openai_body(settings, request)),
            ProviderKind::Anthropic => self
                .client
                .post(format!("{}/messages", settings.base_url))
                .header("x-api-key", &settings.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&anthropic_body(settings, request)),
            ProviderKind::Gemini => self
                .client
                .post(format!(
                    "{}/models/{}:streamGenerateContent?alt=sse",
                    settings.base_url, settings.model
                ))
                .header("x-goog-api-key", &settings.api_key)
                .json(&gemini_body(settings, request)),
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::ProviderStatus {
                provider: settings.provider.display_name().to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TextProvider for LlmAdapter {
    fn name(&self) -> &'static str {
        self.settings.provider.display_name()
    }

    async fn stream(&self, request: CompletionRequest) -> ChatResult<TextStream> {
        let max_retries = self.settings.max_retries.max(1);
        let mut last_error = None;

        // Retries only happen before the first fragment is delivered.
        for attempt in 0..max_retries {
            if attempt > 0 {
                // Exponential backoff: 2s, 4s, ...
                let delay = Duration::from_secs(1 << attempt.min(5));
                tokio::time::sleep(delay).await;
            }

            match self.open(&request).await {
                Ok(response) => {
                    tracing::debug!(
                        provider = self.name(),
                        model = %self.settings.model,
                        attempt = attempt + 1,
                        "stream opened"
                    );
                    return Ok(fragments(self.settings.provider, response));
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        provider = self.name(),
                        attempt = attempt + 1,
                        max_retries,
                        error = %e,
                        "transient provider error"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ChatError::LlmError("Max retries exceeded".to_string())))
    }
}

/// Turn a streaming HTTP body into text fragments.
fn fragments(provider: ProviderKind, response: reqwest::Response) -> TextStream {
    let bytes = response.bytes_stream().boxed();

    let batches = stream::unfold(
        (bytes, SseDecoder::new(), false),
        move |(mut bytes, mut decoder, finished)| async move {
            if finished {
                return None;
            }
            match bytes.next().await {
                Some(Ok(chunk)) => {
                    let items = decode(provider, decoder.push(&chunk));
                    Some((items, (bytes, decoder, false)))
                }
                Some(Err(e)) => {
                    let items = vec![Err(ChatError::StreamInterrupted(e.to_string()))];
                    Some((items, (bytes, decoder, true)))
                }
                None => {
                    let items = decode(provider, decoder.finish().into_iter().collect());
                    Some((items, (bytes, decoder, true)))
                }
            }
        },
    );

    Box::pin(batches.flat_map(stream::iter))
}

fn decode(provider: ProviderKind, payloads: Vec<String>) -> Vec<ChatResult<String>> {
    payloads
        .iter()
        .filter_map(|payload| parse_delta(provider, payload).transpose())
        .collect()
}

/// Extract the text delta from one event payload.
///
/// Payloads that carry no text (role headers, usage, pings) yield `None`.
fn parse_delta(provider: ProviderKind, payload: &str) -> ChatResult<Option<String>> {
    let event: Value = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(error = %e, "skipping non-JSON event payload");
            return Ok(None);
        }
    };

    if let Some(error) = event.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ChatError::StreamInterrupted(message));
    }

    let text = match provider {
        ProviderKind::OpenAI => event
            .pointer("/choices/0/delta/content")
            .and_then(Value::as_str)
            .map(str::to_string),
        ProviderKind::Anthropic => {
            if event.get("type").and_then(Value::as_str) == Some("content_block_delta") {
                event
                    .pointer("/delta/text")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            } else {
                None
            }
        }
        ProviderKind::Gemini => event
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect::<String>()
            }),
    };

    Ok(text.filter(|t| !t.is_empty()))
}

/// Instruction text plus any system messages in the history.
fn system_text(request: &CompletionRequest) -> Option<String> {
    let parts: Vec<&str> = request
        .system
        .as_deref()
        .into_iter()
        .chain(
            request
                .messages
                .iter()
                .filter(|m| m.role == MessageRole::System)
                .map(|m| m.content.as_str()),
        )
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn conversation(request: &CompletionRequest) -> impl Iterator<Item = (MessageRole, &str)> + '_ {
    request
        .messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| (m.role, m.content.as_str()))
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

fn openai_body(settings: &LlmSettings, request: &CompletionRequest) -> OpenAIRequest {
    let system = system_text(request).map(|content| ChatMessage {
        role: "system",
        content,
    });
    let turns = conversation(request).map(|(role, content)| ChatMessage {
        role: match role {
            MessageRole::Assistant => "assistant",
            _ => "user",
        },
        content: content.to_string(),
    });

    OpenAIRequest {
        model: settings.model.clone(),
        messages: system.into_iter().chain(turns).collect(),
        stream: true,
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
    }
}

// Anthropic API types
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: f32,
}

fn anthropic_body(settings: &LlmSettings, request: &CompletionRequest) -> AnthropicRequest {
    AnthropicRequest {
        model: settings.model.clone(),
        max_tokens: settings.max_tokens,
        system: system_text(request),
        messages: conversation(request)
            .map(|(role, content)| ChatMessage {
                role: match role {
                    MessageRole::Assistant => "assistant",
                    _ => "user",
                },
                content: content.to_string(),
            })
            .collect(),
        stream: true,
        temperature: settings.temperature,
    }
}

// Gemini API types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

fn gemini_body(settings: &LlmSettings, request: &CompletionRequest) -> GeminiRequest {
    GeminiRequest {
        contents: conversation(request)
            .map(|(role, content)| GeminiContent {
                role: Some(match role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                }),
                parts: vec![GeminiPart {
                    text: content.to_string(),
                }],
            })
            .collect(),
        system_instruction: system_text(request).map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text }],
        }),
        generation_config: GeminiGenerationConfig {
            temperature: settings.temperature,
            max_output_tokens: settings.max_tokens,
        },
    }
}
