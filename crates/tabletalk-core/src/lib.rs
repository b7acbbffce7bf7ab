//! Business logic and repository trait definitions for TableTalk.
//!
//! This crate defines the "ports" (repository, LLM, catalog, and chat
//! gateway traits) that the infrastructure and api layers implement. It
//! depends only on `tabletalk-types` -- never on `tabletalk-infra` or any
//! database/HTTP crate -- so every pipeline here is testable with
//! in-memory stubs.

pub mod access;
pub mod catalog;
pub mod command;
pub mod dispatch;
pub mod llm;
pub mod prompt;
pub mod replies;
pub mod repository;
pub mod summary;
pub mod window;
