//! LLM provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined
//! in `tabletalk-core`, plus a factory ([`build_provider`]) that constructs
//! the right provider from the `[llm]` configuration section.

pub mod anthropic;
pub mod openai;

use secrecy::{ExposeSecret, SecretString};

use tabletalk_core::llm::LlmProvider;
use tabletalk_types::config::LlmConfig;
use tabletalk_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderKind};

use self::anthropic::AnthropicProvider;
use self::openai::OpenAiCompatibleProvider;

/// Concrete provider selected by configuration.
///
/// The core trait uses native async fn, so providers are dispatched
/// through this enum instead of trait objects.
pub enum AnyProvider {
    Anthropic(AnthropicProvider),
    OpenAi(OpenAiCompatibleProvider),
}

impl LlmProvider for AnyProvider {
    fn name(&self) -> &str {
        match self {
            AnyProvider::Anthropic(provider) => provider.name(),
            AnyProvider::OpenAi(provider) => provider.name(),
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match self {
            AnyProvider::Anthropic(provider) => provider.complete(request).await,
            AnyProvider::OpenAi(provider) => provider.complete(request).await,
        }
    }
}

/// Create an [`AnyProvider`] from the `[llm]` configuration section.
pub fn build_provider(config: &LlmConfig, api_key: SecretString) -> AnyProvider {
    match config.provider {
        ProviderKind::Anthropic => {
            let mut provider = AnthropicProvider::new(api_key);
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            AnyProvider::Anthropic(provider)
        }
        ProviderKind::OpenAi => {
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or(openai::OPENAI_BASE_URL);
            AnyProvider::OpenAi(OpenAiCompatibleProvider::new(
                api_key.expose_secret(),
                base_url,
            ))
        }
    }
}

/// Test provider connectivity by sending a minimal completion request.
///
/// Used at startup to verify the API key and endpoint are working before
/// the bot begins answering commands.
pub async fn test_provider_connection<P: LlmProvider>(
    provider: &P,
    model: &str,
) -> Result<(), LlmError> {
    let request = CompletionRequest::single_turn(model, None, "Hello", 10, Some(0.0));
    provider.complete(&request).await?;
    Ok(())
}
