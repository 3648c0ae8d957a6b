//! Manuals Core Library
//!
//! Shared wire models and error types for the Manuals documentation platform.
//! Used by the `manuals` command-line client.

pub mod api;
pub mod error;

pub use api::*;
pub use error::*;

/// Version segment of the REST base path: `<base_url>/api/<API_VERSION>/<resource>`.
pub const API_VERSION: &str = "2025.12";

/// Request header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";
