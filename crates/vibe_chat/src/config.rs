//! Provider settings.
//!
//! Settings come from an optional workspace file, `.vibe/settings.json`,
//! overlaid with environment variables. API keys are only ever read from the
//! environment.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `VIBE_PROVIDER` | `openai`, `anthropic` or `gemini` |
//! | `VIBE_LLM_MODEL` | model override |
//! | `VIBE_BASE_URL` | base URL for OpenAI-compatible endpoints |
//! | `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` / `GEMINI_API_KEY` | credentials |

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, ChatResult};

/// Supported text-generation providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    /// Detection order when no provider is configured explicitly.
    const DETECTION_ORDER: [ProviderKind; 3] = [Self::OpenAI, Self::Anthropic, Self::Gemini];

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-sonnet-4-5",
            Self::Gemini => "gemini-2.5-flash",
        }
    }

    /// Base URL used when none is configured.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Environment variables holding the API key, first match wins.
    fn key_vars(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAI => &["OPENAI_API_KEY"],
            Self::Anthropic => &["ANTHROPIC_API_KEY"],
            Self::Gemini => &["GEMINI_API_KEY", "API_KEY"],
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(ChatError::InvalidConfig(format!("unknown provider '{}'", other))),
        }
    }
}

/// Resolved provider settings.
#[derive(Clone, Serialize)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    #[serde(skip)]
    pub api_key: String,
    pub model: String,
    /// Endpoint root without trailing slash
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    pub temperature: f32,
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,
    /// Attempts made before the first fragment when the provider fails
    /// transiently
    #[serde(rename = "maxRetries")]
    pub max_retries: u32,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl LlmSettings {
    /// Create settings with defaults for `provider`.
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            temperature: 0.7,
            max_tokens: 8192,
            max_retries: 3,
        }
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Resolve settings from the environment only.
    pub fn from_env() -> ChatResult<Self> {
        Self::resolve(SettingsFile::default(), |name| std::env::var(name).ok())
    }

    /// Resolve settings from `<workspace>/.vibe/settings.json` and the
    /// environment.
    pub fn from_workspace(workspace_root: &Path) -> ChatResult<Self> {
        let file = SettingsFile::load(workspace_root);
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Resolve settings from a settings file and an environment lookup.
    pub fn resolve(
        file: SettingsFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> ChatResult<Self> {
        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());
        let key_for = |provider: ProviderKind| {
            provider.key_vars().iter().find_map(|var| lookup(var))
        };

        let explicit = match lookup("VIBE_PROVIDER") {
            Some(name) => Some(name.parse::<ProviderKind>()?),
            None => file.provider,
        };

        let (provider, api_key) = match explicit {
            Some(provider) => {
                let key = key_for(provider).ok_or(ChatError::LlmNotConfigured)?;
                (provider, key)
            }
            None => ProviderKind::DETECTION_ORDER
                .iter()
                .find_map(|provider| key_for(*provider).map(|key| (*provider, key)))
                .ok_or(ChatError::LlmNotConfigured)?,
        };

        let mut settings = Self::new(provider, api_key);
        if let Some(model) = lookup("VIBE_LLM_MODEL").or(file.model) {
            settings = settings.with_model(model);
        }
        if let Some(base_url) = lookup("VIBE_BASE_URL").or(file.base_url) {
            settings = settings.with_base_url(base_url);
        }
        if let Some(temperature) = file.temperature {
            settings.temperature = temperature;
        }
        if let Some(max_tokens) = file.max_tokens {
            settings.max_tokens = max_tokens;
        }
        if let Some(max_retries) = file.max_retries {
            settings.max_retries = max_retries.max(1);
        }

        tracing::debug!(settings = ?settings, "resolved LLM settings");
        Ok(settings)
    }
}

/// Contents of `.vibe/settings.json`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsFile {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub max_retries: Option<u32>,
}

impl SettingsFile {
    /// Path of the settings file inside a workspace.
    pub fn path(workspace_root: &Path) -> std::path::PathBuf {
        workspace_root.join(".vibe").join("settings.json")
    }

    /// Load the settings file, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load(workspace_root: &Path) -> Self {
        let path = Self::path(workspace_root);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
                Self::default()
            }
        }
    }
}
