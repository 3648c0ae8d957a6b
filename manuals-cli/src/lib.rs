//! Manuals CLI Library
//!
//! Client-side functionality for the `manuals` command-line tool.
//!
//! # Public API
//!
//! The primary public API is the [`client::ManualsClient`] which provides
//! programmatic access to the Manuals REST API. Configuration types are also
//! available via [`config::CliConfig`] and [`config::ConfigBuilder`].
//!
//! ```no_run
//! use manuals_cli::client::ManualsClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ManualsClient::new("http://localhost:8080", "my-api-key")?;
//!
//! let results = client.search("esp32 gpio", 10).await?;
//! println!("{} results for {}", results.total, results.query);
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client for the Manuals REST API.
pub mod client;

/// Configuration types for the CLI tool.
pub mod config;

/// Content-Disposition filename parsing.
pub mod disposition;

#[doc(hidden)]
pub mod logging;

/// Table, JSON and text rendering.
pub mod output;

#[cfg(test)]
pub mod test_utils;
