//! Game catalog lookup.
//!
//! `client` defines the transport trait the infra layer implements
//! against the catalog's XML API, `parse` turns response bodies into
//! structured data, and `service` orchestrates cache, search, details,
//! retry, and description compression.

pub mod client;
pub mod parse;
pub mod service;

pub use client::{CatalogClient, CatalogPage};
pub use service::CatalogService;
