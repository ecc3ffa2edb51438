//! Core types for agents and generation sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vibe_core::AgentRole;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    Assistant,
    User,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Unique message ID (UUID)
    pub id: String,
    /// Role of the message sender
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// When the message was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }
}

/// A request submitted to a text-generation provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// Instruction sent outside the conversation, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation history, oldest first; the last entry is the new turn
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    /// A single-turn request with no separate instruction.
    pub fn single_turn(content: impl Into<String>) -> Self {
        Self {
            system: None,
            messages: vec![Message::user(content)],
        }
    }

    /// Set the instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Content of the newest user message.
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Log entry written when an agent call completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRunRecord {
    pub role: AgentRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A task the coordinator assigns while planning.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannedTask {
    pub agent: String,
    pub description: String,
}

/// Development plan produced by the coordinator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DevelopmentPlan {
    pub plan: String,
    pub tasks: Vec<PlannedTask>,
}

/// Architecture description produced by the architect.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArchitecturePlan {
    /// Component hierarchy, state and data-flow notes, kept verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<serde_json::Value>,
    /// Files the architect expects to exist
    pub files: Vec<String>,
}

/// A single issue raised by the reviewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewIssue {
    pub file: String,
    pub severity: String,
    pub issue: String,
    pub fix: String,
}

/// Review verdict produced by the reviewer.
///
/// The default is "not approved, no issues recorded".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviewReport {
    pub issues: Vec<ReviewIssue>,
    pub improvements: Vec<String>,
    pub approved: bool,
}
