//! # vibe_chat - Agents and Generation for vibeFactory
//!
//! This crate turns a user request into a generated project:
//! - **Single-agent sessions** stream one agent's reply and re-extract the
//!   project on every fragment
//! - **Multi-agent pipeline** runs coordinator, architect, frontend, backend
//!   and reviewer in sequence and synthesizes one project
//! - **Providers** stream from OpenAI-compatible, Anthropic and Gemini APIs
//! - **Project store** keeps generated projects in the workspace
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐     ┌───────────────────┐
//! │ GenerationSession │     │   Orchestrator    │
//! └─────────┬─────────┘     └─────────┬─────────┘
//!           │                         │ 5 × Agent
//!           └────────────┬────────────┘
//!                        ▼
//!              ┌───────────────────┐
//!              │   TextProvider    │  LlmAdapter / ScriptedProvider
//!              └─────────┬─────────┘
//!                        ▼
//!              ┌───────────────────┐
//!              │ vibe_core extract │──▶ FileSet ──▶ ProjectStore
//!              └───────────────────┘
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod mock;
pub mod orchestrator;
pub mod persistence;
pub mod prompts;
pub mod provider;
pub mod session;
pub mod sse;
pub mod types;

pub use agent::*;
pub use config::*;
pub use error::*;
pub use llm::*;
pub use mock::*;
pub use orchestrator::*;
pub use persistence::*;
pub use provider::*;
pub use session::*;
pub use types::*;
