//! [`LlmProvider`] backed by the Anthropic Messages API.
//!
//! One POST to `/v1/messages` per completion, never streamed. The API key
//! lives in a [`SecretString`] and surfaces only while the auth header is
//! built; the provider has no `Debug` impl so the key cannot ride along in
//! error or log formatting.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use tabletalk_core::llm::LlmProvider;
use tabletalk_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::types::{MessagesRequest, MessagesResponse};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (tests, proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&MessagesRequest::from_completion(request))
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("transport error: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        Ok(CompletionResponse {
            content: parsed.text(),
            stop_reason: parsed.neutral_stop_reason(),
            id: parsed.id,
            model: parsed.model,
            usage: Usage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
        })
    }
}

/// Map a non-2xx Messages API status onto the error taxonomy.
fn status_error(status: u16, body: String) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
