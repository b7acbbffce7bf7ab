//! The port every text-generation backend implements.
//!
//! The bot needs exactly one capability from a model: turn a prompt into
//! prose once, blocking the calling task until done. Summaries and catalog
//! description compression both ride on that single method, so the trait
//! stays this small on purpose.

use tabletalk_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Generation backend, implemented in tabletalk-infra for Anthropic and
/// OpenAI-compatible endpoints.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait
/// macro); callers are generic over `P: LlmProvider` rather than holding
/// trait objects.
pub trait LlmProvider: Send + Sync {
    /// Short backend label for logs ("anthropic", "openai").
    fn name(&self) -> &str;

    /// Run one completion call to the backing service.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
