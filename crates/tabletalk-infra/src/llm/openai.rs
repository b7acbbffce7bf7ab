//! OpenAI-compatible chat completions provider.
//!
//! Talks to `api.openai.com` by default; any endpoint speaking the same
//! protocol works through the `[llm] base_url` setting. Request and
//! response types come from [`async_openai`].

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
};

use tabletalk_core::llm::LlmProvider;
use tabletalk_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StopReason, Usage,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// No `Debug` impl: the wrapped [`Client`] carries the API key, and this
/// struct must not offer a path for it to reach logs. Same rule as
/// [`super::anthropic::AnthropicProvider`].
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompatibleProvider {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Client::with_config(config),
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .chat()
            .create(chat_request(request))
            .await
            .map_err(map_openai_error)?;

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        // An empty choices array is legal on the wire; treat it as an
        // empty completion rather than an error.
        let (content, stop_reason) = match response.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content.unwrap_or_default(),
                choice.finish_reason.and_then(|reason| match reason {
                    FinishReason::Stop => Some(StopReason::EndTurn),
                    FinishReason::Length => Some(StopReason::MaxTokens),
                    _ => None,
                }),
            ),
            None => (String::new(), None),
        };

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

/// Assemble the protocol request: optional system message first, then the
/// conversation turns in order.
fn chat_request(request: &CompletionRequest) -> CreateChatCompletionRequest {
    let system = request
        .system
        .clone()
        .map(|text| chat_message(MessageRole::System, text));
    let turns = request
        .messages
        .iter()
        .map(|m| chat_message(m.role.clone(), m.content.clone()));

    CreateChatCompletionRequest {
        model: request.model.clone(),
        messages: system.into_iter().chain(turns).collect(),
        max_completion_tokens: Some(request.max_tokens),
        temperature: request.temperature.map(|t| t as f32),
        ..Default::default()
    }
}

fn chat_message(role: MessageRole, content: String) -> ChatCompletionRequestMessage {
    match role {
        MessageRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(content),
                name: None,
            })
        }
        MessageRole::User => {
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(content),
                name: None,
            })
        }
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(content)),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

/// The compat protocol reports failures through `code`/`type` strings, and
/// some deployments only fill in the message; sniff all three.
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    let api = match &err {
        OpenAIError::ApiError(api) => api,
        OpenAIError::JSONDeserialize(e) => return LlmError::Deserialization(e.to_string()),
        _ => {
            return LlmError::Provider {
                message: err.to_string(),
            };
        }
    };

    let code = api.code.as_deref().unwrap_or("");
    let kind = api.r#type.as_deref().unwrap_or("");

    if code == "authentication_error"
        || kind == "authentication_error"
        || api.message.contains("Incorrect API key")
        || api.message.contains("Invalid API key")
    {
        LlmError::AuthenticationFailed
    } else if code == "rate_limit_exceeded" || kind == "rate_limit_error" {
        LlmError::RateLimited {
            retry_after_ms: None,
        }
    } else if code == "server_error" || kind == "overloaded_error" {
        LlmError::Overloaded(api.message.clone())
    } else {
        LlmError::Provider {
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
