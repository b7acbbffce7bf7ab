//! Environment-sourced secrets.
//!
//! TableTalk never stores credentials in `config.toml` or the database.
//! The Telegram bot token and the LLM API key are read from environment
//! variables at startup and wrapped in [`SecretString`] so they cannot
//! leak through `Debug` output or logs.

use secrecy::SecretString;

use tabletalk_types::llm::ProviderKind;

/// Telegram Bot API token.
pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
/// API key for the Anthropic Messages API.
pub const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// API key for OpenAI-compatible chat completions.
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

/// A required secret could not be read from the environment.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {0} is not valid Unicode")]
    NotUnicode(&'static str),
}

/// Read the Telegram bot token from `TELEGRAM_BOT_TOKEN`.
pub fn bot_token() -> Result<SecretString, SecretError> {
    read_var(BOT_TOKEN_VAR)
}

/// Read the API key for the configured LLM provider.
///
/// Anthropic reads `ANTHROPIC_API_KEY`, OpenAI-compatible providers read
/// `OPENAI_API_KEY`.
pub fn llm_api_key(provider: ProviderKind) -> Result<SecretString, SecretError> {
    match provider {
        ProviderKind::Anthropic => read_var(ANTHROPIC_KEY_VAR),
        ProviderKind::OpenAi => read_var(OPENAI_KEY_VAR),
    }
}

fn read_var(name: &'static str) -> Result<SecretString, SecretError> {
    match std::env::var(name) {
        // Deployment platforms sometimes export required vars as "".
        Ok(value) if value.trim().is_empty() => Err(SecretError::Missing(name)),
        Ok(value) => Ok(SecretString::from(value)),
        Err(std::env::VarError::NotPresent) => Err(SecretError::Missing(name)),
        Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::NotUnicode(name)),
    }
}
