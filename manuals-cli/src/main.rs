//! Manuals CLI
//!
//! Command-line interface for searching the Manuals documentation platform.

use anyhow::Result;
use clap::Parser;
use manuals_cli::cli::{
    generate_completion, handle_config, handle_devices, handle_documents, handle_search,
    handle_version, Cli, Commands,
};
use manuals_cli::client::ManualsClient;
use manuals_cli::config::CliConfig;
use manuals_cli::logging;
use manuals_cli::output::Renderer;
use std::io::IsTerminal;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and --version exit 0, usage errors exit 1 like any other failure
            let _ = e.print();
            std::process::exit(if e.exit_code() == 0 { 0 } else { 1 });
        }
    };
    logging::init(cli.verbose);

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Commands that never touch configuration
    match cli.command {
        Commands::Version => return handle_version(&mut std::io::stdout()),
        Commands::Completion { shell } => {
            generate_completion(shell);
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    tracing::debug!(
        "Using API {} with {} output",
        config.api_url,
        config.output_format
    );

    let mut out = Renderer::stdout(&config.output_format);

    if let Commands::Config { command } = cli.command {
        return handle_config(command, &config, cli.config.as_deref(), &mut out);
    }

    config.require_api_key()?;
    let client = ManualsClient::new(&config.api_url, &config.api_key)?;

    match cli.command {
        Commands::Search { query, limit } => {
            handle_search(&client, &query.join(" "), limit, &mut out).await
        }
        Commands::Devices { command } => handle_devices(&client, command, &mut out).await,
        Commands::Documents { command } => handle_documents(&client, command, &mut out).await,
        Commands::Config { .. } | Commands::Version | Commands::Completion { .. } => Ok(()),
    }
}

/// Build configuration using the priority chain: defaults → file → env → flags
fn load_config(cli: &Cli) -> Result<CliConfig> {
    let mut builder = CliConfig::builder();

    if !cli.no_config {
        builder = builder.with_config_file(cli.config.as_deref())?;
    }

    builder = builder.with_env_overrides();

    if let Some(ref url) = cli.api_url {
        builder = builder.with_api_url(url)?;
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.with_api_key(key);
    }
    if let Some(ref format) = cli.format {
        builder = builder.with_output_format(format);
    }

    builder.build()
}
