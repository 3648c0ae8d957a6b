//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Manuals documentation platform CLI
#[derive(Parser, Debug)]
#[command(name = "manuals", version)]
#[command(
    about = "CLI for the Manuals documentation platform",
    long_about = "Search and access hardware and software documentation from the Manuals platform.\n\n\
Configure the API endpoint and key via environment variables:\n  \
MANUALS_API_URL  - API base URL (default: http://localhost:8080)\n  \
MANUALS_API_KEY  - API key for authentication (required)\n\n\
Or create a config file at ~/.manuals.yaml:\n  \
api_url: http://manuals.local:8080\n  \
api_key: your-api-key\n  \
output_format: table"
)]
pub struct Cli {
    /// API base URL (overrides config file and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// API key (overrides config file and environment)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Output format: table, json or text (overrides config file)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Config file path (default: ~/.manuals.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for devices and documentation
    ///
    /// Uses semantic search on the server. Results are ranked by relevance.
    Search {
        /// Search terms, joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// List and view devices
    Devices {
        #[command(subcommand)]
        command: DeviceCommands,
    },

    /// List, view and download documents
    #[command(visible_alias = "docs")]
    Documents {
        #[command(subcommand)]
        command: DocumentCommands,
    },

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommands {
    /// List devices
    List {
        /// Maximum number of results
        #[arg(short, long, default_value_t = 50)]
        limit: u32,

        /// Offset for pagination
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Filter by domain (hardware, software)
        #[arg(short, long, default_value = "")]
        domain: String,

        /// Filter by type (dev-boards, sensors, ...)
        #[arg(short = 't', long = "type", default_value = "")]
        device_type: String,
    },

    /// Get device details
    Get {
        /// Device ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocumentCommands {
    /// List documents
    List {
        /// Maximum number of results
        #[arg(short, long, default_value_t = 50)]
        limit: u32,

        /// Offset for pagination
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Filter by device ID
        #[arg(long = "device", default_value = "")]
        device_id: String,
    },

    /// Get document details
    Get {
        /// Document ID
        id: String,
    },

    /// Download a document
    ///
    /// Saves to the current directory with the original filename unless
    /// --output names a file or an existing directory.
    Download {
        /// Document ID
        id: String,

        /// Output path (file or directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value (api_url, api_key, output_format)
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Reset configuration file to defaults
    Reset,
}
