use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConciergeError, Result};

/// Hard ceiling on how many history turns are replayed into a prompt.
pub const MAX_PROMPT_HISTORY_TURNS: usize = 10;

/// Hard ceiling on how many turns a session retains.
pub const MAX_HISTORY_TURNS: usize = 20;

/// Top-level configuration for the Concierge service.
///
/// Loaded from `~/.concierge/config.toml` by default. Each section
/// corresponds to one subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConciergeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl ConciergeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConciergeConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values that would make the service misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        let r = &self.retrieval;
        if r.top_k == 0 {
            return Err(ConciergeError::Config("retrieval.top_k must be at least 1".into()));
        }
        if r.similarity_threshold < 0.0 || r.answer_threshold < 0.0 {
            return Err(ConciergeError::Config(
                "retrieval thresholds must be non-negative".into(),
            ));
        }
        if r.answer_threshold < r.similarity_threshold {
            return Err(ConciergeError::Config(format!(
                "retrieval.answer_threshold ({}) must not be below similarity_threshold ({})",
                r.answer_threshold, r.similarity_threshold
            )));
        }
        if r.tie_epsilon.is_nan() || r.tie_epsilon <= 0.0 {
            return Err(ConciergeError::Config("retrieval.tie_epsilon must be positive".into()));
        }

        let c = &self.chat;
        if c.max_message_length == 0 {
            return Err(ConciergeError::Config("chat.max_message_length must be at least 1".into()));
        }
        if c.max_history_turns < 2 {
            return Err(ConciergeError::Config(
                "chat.max_history_turns must hold at least one exchange".into(),
            ));
        }
        if c.max_history_turns > MAX_HISTORY_TURNS {
            return Err(ConciergeError::Config(format!(
                "chat.max_history_turns {} exceeds the limit of {}",
                c.max_history_turns, MAX_HISTORY_TURNS
            )));
        }

        let g = &self.generator;
        if g.max_tokens == 0 {
            return Err(ConciergeError::Config("generator.max_tokens must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&g.temperature) {
            return Err(ConciergeError::Config(format!(
                "generator.temperature {} outside 0.0..=2.0",
                g.temperature
            )));
        }
        if g.top_p <= 0.0 || g.top_p > 1.0 {
            return Err(ConciergeError::Config(format!(
                "generator.top_p {} outside (0.0, 1.0]",
                g.top_p
            )));
        }
        if g.timeout_secs == 0 {
            return Err(ConciergeError::Config("generator.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Knowledge retrieval and ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of contexts handed to the composer.
    pub top_k: usize,
    /// Lenient cut-off below which a knowledge entry is not a context at all.
    pub similarity_threshold: f64,
    /// Stricter cut-off the best score must reach before the generator is called.
    pub answer_threshold: f64,
    /// Composite scores closer than this are ranked by entry priority instead.
    pub tie_epsilon: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            similarity_threshold: 0.05,
            answer_threshold: 1.0,
            tie_epsilon: 1e-6,
        }
    }
}

/// Conversation handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Whether the chat engine accepts messages at all.
    pub enabled: bool,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
    /// Turns retained per session (at most 20); older turns are dropped.
    pub max_history_turns: usize,
    /// Turns replayed into each generator prompt (capped at 10).
    pub prompt_history_turns: usize,
}

impl ChatConfig {
    /// Prompt history length after applying the hard ceiling.
    pub fn effective_prompt_turns(&self) -> usize {
        self.prompt_history_turns.min(MAX_PROMPT_HISTORY_TURNS)
    }

    /// Retained history length, kept within one exchange and the hard ceiling.
    pub fn effective_history_turns(&self) -> usize {
        self.max_history_turns.clamp(2, MAX_HISTORY_TURNS)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_message_length: 1000,
            max_history_turns: 20,
            prompt_history_turns: 6,
        }
    }
}

/// Upstream text generator (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Bearer token. When absent, every reply uses the local fallback.
    pub api_key: Option<String>,
    /// Base URL of the chat completions API.
    pub base_url: String,
    /// Model identifier sent with each request.
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            max_tokens: 200,
            temperature: 0.8,
            top_p: 0.9,
            timeout_secs: 30,
        }
    }
}

/// Where business profiles and knowledge entries are loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the businesses TOML file.
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "~/.concierge/businesses.toml".to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
