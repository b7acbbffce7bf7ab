//! Configuration types for TableTalk.
//!
//! `BotConfig` represents the top-level `config.toml` that controls the LLM
//! provider, the chat allow-list, summary window limits, catalog caching, and
//! the discussion-prompt schedule. Secrets (bot token, API keys) are never
//! part of this file -- they come from the environment.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderKind;

/// Top-level configuration for the TableTalk bot.
///
/// Loaded from `<data-dir>/config.toml`. All fields have working defaults so
/// an empty (or absent) file yields a usable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Text-generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which backend serves generation calls.
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    /// Model identifier passed to the provider.
    #[serde(default = "default_model")]
    pub model: String,
    /// Output budget per call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Override for the provider API base URL (self-hosted gateways, tests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_provider() -> ProviderKind {
    ProviderKind::OpenAi
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: None,
        }
    }
}

/// Chat allow-list. Empty means unrestricted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
}

/// Summary window limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Ceiling for a requested window, in hours. Larger requests are clamped
    /// with a warning, not rejected.
    #[serde(default = "default_max_window_hours")]
    pub max_window_hours: u32,
}

fn default_max_window_hours() -> u32 {
    168
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_window_hours: default_max_window_hours(),
        }
    }
}

/// External game-catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog's XML API.
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// Days a cached entry stays fresh.
    #[serde(default = "default_cache_ttl_days")]
    pub cache_ttl_days: i64,
    /// How many times a "still processing" response is retried.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Fixed delay between those retries, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

fn default_catalog_base_url() -> String {
    "https://boardgamegeek.com/xmlapi2".to_string()
}

fn default_cache_ttl_days() -> i64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            cache_ttl_days: default_cache_ttl_days(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

/// Scheduled discussion-prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Master switch for the prompt scheduler.
    #[serde(default = "default_prompts_enabled")]
    pub enabled: bool,
    /// Cron schedule (seconds-resolution, or "every N minutes/hours" forms).
    #[serde(default = "default_prompt_schedule")]
    pub schedule: String,
    /// Chats that receive scheduled prompts.
    #[serde(default)]
    pub chats: Vec<i64>,
    /// Days before the same prompt may repeat in a chat.
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: i64,
    /// Replacement question list. Empty uses the built-in catalog.
    #[serde(default)]
    pub questions: Vec<String>,
}

fn default_prompts_enabled() -> bool {
    true
}

fn default_prompt_schedule() -> String {
    // Fridays at 18:00 UTC.
    "0 0 18 * * Fri".to_string()
}

fn default_cooldown_days() -> i64 {
    7
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            enabled: default_prompts_enabled(),
            schedule: default_prompt_schedule(),
            chats: Vec::new(),
            cooldown_days: default_cooldown_days(),
            questions: Vec::new(),
        }
    }
}

/// Keep-alive HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
