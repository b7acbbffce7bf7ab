//! Scheduled discussion prompts.
//!
//! `questions` holds the built-in question catalog, `service` picks the
//! least-recently-used prompt per chat and records deliveries, and
//! `scheduler` fires the weekly round off a cron expression.

pub mod questions;
pub mod scheduler;
pub mod service;

pub use scheduler::PromptScheduler;
pub use service::PromptService;
