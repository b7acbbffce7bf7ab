//! Claude over the Anthropic Messages API.
//!
//! [`AnthropicProvider`] is the
//! [`LlmProvider`](tabletalk_core::llm::LlmProvider) impl; `types` holds
//! the wire structs.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
