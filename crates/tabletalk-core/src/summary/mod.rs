//! Conversation summarization.
//!
//! `transcript` renders stored messages into the plain-text form the
//! model sees; `service` owns prompt construction and the provider call.

pub mod service;
pub mod transcript;

pub use service::SummaryService;

/// Render an hour count for prompts and replies: whole numbers without a
/// decimal point, fractional windows with one decimal place.
pub fn format_hours(hours: f64) -> String {
    if (hours - hours.round()).abs() < 0.05 {
        format!("{}", hours.round() as i64)
    } else {
        format!("{hours:.1}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
