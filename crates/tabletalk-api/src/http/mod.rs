//! Keep-alive HTTP layer for TableTalk.
//!
//! A minimal axum server whose job is to answer uptime pingers so free-tier
//! hosts keep the bot process alive. No state, no auth.

pub mod router;
