//! LLM request/response types for TableTalk.
//!
//! These types model the data shapes for the text-generation boundary: a
//! single non-streaming completion call with a system instruction, a bounded
//! output budget, and a temperature. Both the chat summarizer and the catalog
//! description compressor go through them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Speaker of one conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("unknown message role: {other}")),
        }
    }
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Everything a provider needs for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl CompletionRequest {
    /// Single-user-turn request, the only shape this bot sends.
    pub fn single_turn(
        model: impl Into<String>,
        system: Option<String>,
        prompt: impl Into<String>,
        max_tokens: u32,
        temperature: Option<f64>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message {
                role: MessageRole::User,
                content: prompt.into(),
            }],
            system,
            max_tokens,
            temperature,
        }
    }
}

/// What a provider hands back for one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    /// `None` when the provider reported a stop reason we do not model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    pub usage: Usage,
}

/// Why generation ended, normalized across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EndTurn => write!(f, "end_turn"),
            StopReason::MaxTokens => write!(f, "max_tokens"),
            StopReason::StopSequence => write!(f, "stop_sequence"),
        }
    }
}

impl FromStr for StopReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "end_turn" => Ok(StopReason::EndTurn),
            "max_tokens" => Ok(StopReason::MaxTokens),
            "stop_sequence" => Ok(StopReason::StopSequence),
            other => Err(format!("unknown stop reason: {other}")),
        }
    }
}

/// Token counts reported by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Failure modes of the generation boundary.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("response did not deserialize: {0}")]
    Deserialization(String),

    #[error("rate limited, retry after {retry_after_ms:?} ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider is overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Which provider backend serves generation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(format!("unknown provider kind: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_render_and_parse_case_insensitively() {
        assert_eq!(MessageRole::User.to_string(), "user");
        assert_eq!("ASSISTANT".parse::<MessageRole>(), Ok(MessageRole::Assistant));
        assert!("narrator".parse::<MessageRole>().is_err());
    }

    #[test]
    fn single_turn_builds_one_user_message() {
        let req = CompletionRequest::single_turn(
            "gpt-4o-mini",
            Some("You summarize chats.".to_string()),
            "Summarize this.",
            1000,
            Some(0.7),
        );
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, MessageRole::User);
        assert_eq!(req.max_tokens, 1000);
        assert_eq!(req.temperature, Some(0.7));
    }

    #[test]
    fn absent_options_are_not_serialized() {
        let req = CompletionRequest::single_turn("m", None, "p", 100, None);
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("system"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn stop_reasons_parse_case_insensitively() {
        assert_eq!("end_turn".parse::<StopReason>(), Ok(StopReason::EndTurn));
        assert_eq!("MAX_TOKENS".parse::<StopReason>(), Ok(StopReason::MaxTokens));
        assert!("tool_use".parse::<StopReason>().is_err());
    }

    #[test]
    fn error_messages_render() {
        let err = LlmError::Provider {
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "provider error: boom");
        assert_eq!(
            LlmError::AuthenticationFailed.to_string(),
            "authentication failed"
        );
    }

    #[test]
    fn provider_kinds_round_trip() {
        assert_eq!("openai".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!(
            "Anthropic".parse::<ProviderKind>(),
            Ok(ProviderKind::Anthropic)
        );
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }
}
