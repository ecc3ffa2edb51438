//! Error types for the chat system.

use std::time::Duration;

use thiserror::Error;

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Chat system errors
#[derive(Error, Debug)]
pub enum ChatError {
    /// No provider credentials were found
    #[error("LLM not configured. Set OPENAI_API_KEY, ANTHROPIC_API_KEY or GEMINI_API_KEY")]
    LlmNotConfigured,

    /// The provider rejected the request before streaming began
    #[error("{provider} API error {status}: {body}")]
    ProviderStatus {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider failed for another reason
    #[error("LLM error: {0}")]
    LlmError(String),

    /// The fragment stream ended with an error
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The caller cancelled the generation
    #[error("generation cancelled")]
    Cancelled,

    /// A pipeline stage exceeded its time budget
    #[error("{stage} stage timed out after {limit:?}")]
    Timeout { stage: String, limit: Duration },

    /// Invalid settings value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Stored project not found
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Artifact error
    #[error(transparent)]
    Core(#[from] vibe_core::CoreError),
}

impl ChatError {
    /// Whether the error is worth retrying before any fragment was received.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ProviderStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_keeps_sub_second_limits() {
        let err = ChatError::Timeout {
            stage: "review".to_string(),
            limit: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "review stage timed out after 250ms");
    }

    #[test]
    fn test_transient_statuses() {
        let status = |status| ChatError::ProviderStatus {
            provider: "OpenAI".to_string(),
            status,
            body: String::new(),
        };
        assert!(status(429).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(401).is_transient());
        assert!(!ChatError::Cancelled.is_transient());
    }
}
