//! Infrastructure layer for TableTalk.
//!
//! Contains implementations of the ports defined in `tabletalk-core`:
//! SQLite storage, the catalog HTTP client, the LLM providers, plus the
//! config loader and environment-sourced secrets.

pub mod catalog;
pub mod config;
pub mod llm;
pub mod secret;
pub mod sqlite;
