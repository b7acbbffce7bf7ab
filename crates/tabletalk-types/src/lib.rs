//! Shared domain types for TableTalk.
//!
//! This crate contains the core domain types used across the TableTalk bot:
//! stored messages, time windows, catalog entries, discussion prompts, LLM
//! request/response shapes, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
pub mod message;
pub mod prompt;
pub mod window;
