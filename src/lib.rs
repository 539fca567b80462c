//! Backend for a localized portfolio site.
//!
//! Resolves the locale of each page request, fetches that locale's messages
//! from the remote message API or bundled JSON files (optionally through a TTL
//! cache) and serves the code snippets shown on project pages.

pub mod config;
pub mod error;
pub mod i18n;
pub mod pages;
pub mod server;
pub mod snippets;
