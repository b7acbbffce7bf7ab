//! LLM provider abstraction for TableTalk.
//!
//! Defines the `LlmProvider` trait that concrete backends (Anthropic,
//! OpenAI) implement in tabletalk-infra. The summarizer and the catalog
//! description compressor both talk to the model exclusively through it.

pub mod provider;

pub use provider::LlmProvider;
