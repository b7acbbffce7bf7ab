//! Board-game catalog HTTP integration.

pub mod client;

pub use client::HttpCatalogClient;
