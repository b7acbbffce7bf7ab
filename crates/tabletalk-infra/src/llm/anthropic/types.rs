//! Wire structs for the Anthropic Messages API.
//!
//! Serde mirrors of the JSON bodies on `/v1/messages`, kept apart from the
//! provider-neutral types in `tabletalk-types`. Conversions to and from the
//! neutral request/response live here so the client only moves bytes.

use serde::{Deserialize, Serialize};

use tabletalk_types::llm::{CompletionRequest, StopReason};

/// POST body for `/v1/messages`. Always non-streaming.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<RequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestMessage {
    pub role: String,
    pub content: String,
}

impl MessagesRequest {
    /// Lower a provider-neutral request onto the Anthropic wire shape.
    pub fn from_completion(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            messages: request
                .messages
                .iter()
                .map(|m| RequestMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            system: request.system.clone(),
            stream: false,
            temperature: request.temperature,
        }
    }
}

/// One entry of the response `content` array.
///
/// Requests never enable tools, so in practice only `text` comes back, but
/// the deserializer tolerates `tool_use` rather than failing on it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Response body of a non-streaming `/v1/messages` call.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

impl MessagesResponse {
    /// Concatenated text of the response, skipping non-text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::ToolUse { .. } => None,
            })
            .collect()
    }

    /// Stop reason mapped to the neutral enum; unknown strings become `None`.
    pub fn neutral_stop_reason(&self) -> Option<StopReason> {
        self.stop_reason.as_deref().and_then(|s| s.parse().ok())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_the_wire_shape() {
        let neutral = CompletionRequest::single_turn(
            "claude-sonnet-4-20250514",
            Some("Answer briefly.".to_string()),
            "What is Carcassonne?",
            256,
            Some(0.3),
        );

        let wire = serde_json::to_value(MessagesRequest::from_completion(&neutral)).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 256,
                "messages": [{"role": "user", "content": "What is Carcassonne?"}],
                "system": "Answer briefly.",
                "stream": false,
                "temperature": 0.3,
            })
        );
    }

    #[test]
    fn absent_options_stay_off_the_wire() {
        let neutral =
            CompletionRequest::single_turn("claude-sonnet-4-20250514", None, "hi", 64, None);

        let wire = serde_json::to_value(MessagesRequest::from_completion(&neutral)).unwrap();
        assert!(wire.get("system").is_none());
        assert!(wire.get("temperature").is_none());
    }

    #[test]
    fn response_text_skips_tool_blocks() {
        let body = r#"{
            "id": "msg_01",
            "content": [
                {"type": "text", "text": "Tile-laying "},
                {"type": "tool_use", "id": "t1", "name": "noop", "input": {}},
                {"type": "text", "text": "classic."}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 5}
        }"#;

        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text(), "Tile-laying classic.");
        assert_eq!(parsed.neutral_stop_reason(), Some(StopReason::EndTurn));
        assert_eq!(parsed.usage.output_tokens, 5);
    }

    #[test]
    fn unknown_stop_reason_and_missing_usage_degrade() {
        let body = r#"{
            "id": "msg_02",
            "content": [{"type": "text", "text": "ok"}],
            "model": "m",
            "stop_reason": "pause_turn",
            "usage": {}
        }"#;

        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.neutral_stop_reason(), None);
        assert_eq!(parsed.usage.input_tokens, 0);
    }
}
