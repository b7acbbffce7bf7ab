//! Summary generation service.
//!
//! Builds the summarization prompt from a rendered transcript and asks
//! the configured LLM provider for a single completion. Provider failures
//! never propagate: the user gets a fallback line and the error goes to
//! the log.

use std::sync::Arc;

use tabletalk_types::config::LlmConfig;
use tabletalk_types::llm::CompletionRequest;
use tabletalk_types::message::StoredMessage;

use crate::llm::LlmProvider;
use crate::summary::{format_hours, transcript};

/// System prompt for conversation summaries.
const SUMMARY_SYSTEM_PROMPT: &str =
    "You are an assistant that summarizes group-chat conversations in a clear, structured way.";

/// What the user sees when the provider call fails.
pub const SUMMARY_FALLBACK: &str =
    "❌ Couldn't generate the summary right now. Please try again in a few minutes.";

/// Generates conversation summaries through an LLM provider.
pub struct SummaryService<P> {
    provider: Arc<P>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl<P: LlmProvider> SummaryService<P> {
    pub fn new(provider: Arc<P>, config: &LlmConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Summarize an ascending-ordered window of messages.
    ///
    /// Callers guarantee `messages` is non-empty; an empty window gets its
    /// own reply without ever reaching the model. Windows longer than the
    /// transcript cap are cut down to the most recent messages, while the
    /// prompt still reports the full count.
    #[tracing::instrument(
        name = "summary.generate",
        skip(self, messages),
        fields(message_count = messages.len(), model = %self.model)
    )]
    pub async fn summarize(&self, messages: &[StoredMessage], hours_covered: f64) -> String {
        let total = messages.len();
        let recent = transcript::recent(messages);
        if recent.len() < total {
            tracing::debug!(kept = recent.len(), total, "transcript truncated");
        }

        let request = CompletionRequest::single_turn(
            &self.model,
            Some(SUMMARY_SYSTEM_PROMPT.to_string()),
            build_prompt(recent, total, hours_covered),
            self.max_tokens,
            Some(self.temperature),
        );

        match self.provider.complete(&request).await {
            Ok(response) => response.content.trim().to_string(),
            Err(error) => {
                tracing::error!(provider = self.provider.name(), %error, "summary generation failed");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

fn build_prompt(messages: &[StoredMessage], total_count: usize, hours_covered: f64) -> String {
    format!(
        "Summarize the following group-chat conversation from the last {} hours \
         ({} messages in total).\n\n\
         Conversation:\n{}\n\n\
         Provide a structured summary with:\n\
         1. **Main topics**: the subjects discussed most\n\
         2. **Active participants**: who took part the most\n\
         3. **Key points**: decisions, agreements, or important information\n\
         4. **Tone**: the overall mood of the conversation\n\n\
         Keep the summary concise but informative.",
        format_hours(hours_covered),
        total_count,
        transcript::render(messages)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
