//! Command execution handlers

use anyhow::{Context, Result};
use colored::*;
use manuals_core::{ManualsError, Page};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::client::ManualsClient;
use crate::config::{CliConfig, FileConfig};
use crate::output::{format_size, format_success, short_id, truncate, OutputFormat, Renderer};

use super::commands::*;

/// Snippets shown under the search table in text mode
const SNIPPET_COUNT: usize = 3;

/// Handle search command
pub async fn handle_search<W: Write>(
    client: &ManualsClient,
    query: &str,
    limit: u32,
    out: &mut Renderer<W>,
) -> Result<()> {
    let results = client.search(query, limit).await.context("search failed")?;

    if out.is_json() {
        return out.render_json(&results);
    }

    if results.results.is_empty() {
        out.print_line("No results found.")?;
        return Ok(());
    }

    out.render_text(format_args!(
        "Found {} results for \"{}\":\n\n",
        results.total, results.query
    ))?;

    let rows: Vec<Vec<String>> = results
        .results
        .iter()
        .map(|r| {
            vec![
                short_id(&r.device_id).to_string(),
                truncate(&r.name, 40),
                r.domain.clone(),
                r.device_type.clone(),
                format!("{:.2}", r.score),
            ]
        })
        .collect();
    out.render_table(&["ID", "NAME", "DOMAIN", "TYPE", "SCORE"], &rows)?;

    if out.format() == OutputFormat::Text {
        out.print_line("\n--- Snippets ---")?;
        for r in results.results.iter().take(SNIPPET_COUNT) {
            if r.snippet.is_empty() {
                continue;
            }
            out.render_text(format_args!("\n[{}] {}\n", short_id(&r.device_id), r.name))?;
            out.render_text(format_args!("  {}\n", truncate(&r.snippet, 200)))?;
        }
    }

    Ok(())
}

/// Handle device commands
pub async fn handle_devices<W: Write>(
    client: &ManualsClient,
    command: DeviceCommands,
    out: &mut Renderer<W>,
) -> Result<()> {
    match command {
        DeviceCommands::List {
            limit,
            offset,
            domain,
            device_type,
        } => {
            let page = client
                .list_devices(limit, offset, &domain, &device_type)
                .await
                .context("failed to list devices")?;

            if out.is_json() {
                return out.render_json(&page);
            }

            if page.is_empty() {
                out.print_line("No devices found.")?;
                return Ok(());
            }

            out.render_text(format_args!(
                "Showing {} of {} devices:\n\n",
                page.data.len(),
                page.total
            ))?;

            let rows: Vec<Vec<String>> = page
                .data
                .iter()
                .map(|d| {
                    vec![
                        short_id(&d.id).to_string(),
                        truncate(&d.name, 45),
                        d.domain.clone(),
                        d.device_type.clone(),
                    ]
                })
                .collect();
            out.render_table(&["ID", "NAME", "DOMAIN", "TYPE"], &rows)?;

            print_pagination_hint(&page, out)?;
        }
        DeviceCommands::Get { id } => {
            let device = client
                .get_device(&id)
                .await
                .context("failed to get device")?;

            if out.is_json() {
                return out.render_json(&device);
            }

            out.render_text(format_args!("{} {}\n", "Device:".bold(), device.name.cyan()))?;
            out.render_text(format_args!("  ID:        {}\n", device.id))?;
            out.render_text(format_args!("  Domain:    {}\n", device.domain))?;
            out.render_text(format_args!("  Type:      {}\n", device.device_type))?;
            out.render_text(format_args!("  Path:      {}\n", device.path))?;
            out.render_text(format_args!("  Indexed:   {}\n", device.indexed_at))?;

            if let Some(content) = device.content.as_deref().filter(|c| !c.is_empty()) {
                out.render_text(format_args!("\n--- Content ---\n{}\n", content))?;
            }
        }
    }

    Ok(())
}

/// Handle document commands
pub async fn handle_documents<W: Write>(
    client: &ManualsClient,
    command: DocumentCommands,
    out: &mut Renderer<W>,
) -> Result<()> {
    match command {
        DocumentCommands::List {
            limit,
            offset,
            device_id,
        } => {
            let page = client
                .list_documents(limit, offset, &device_id)
                .await
                .context("failed to list documents")?;

            if out.is_json() {
                return out.render_json(&page);
            }

            if page.is_empty() {
                out.print_line("No documents found.")?;
                return Ok(());
            }

            out.render_text(format_args!(
                "Showing {} of {} documents:\n\n",
                page.data.len(),
                page.total
            ))?;

            let rows: Vec<Vec<String>> = page
                .data
                .iter()
                .map(|d| {
                    vec![
                        short_id(&d.id).to_string(),
                        truncate(&d.filename, 45),
                        d.mime_type.clone(),
                        format_size(d.size_bytes),
                    ]
                })
                .collect();
            out.render_table(&["ID", "FILENAME", "TYPE", "SIZE"], &rows)?;

            print_pagination_hint(&page, out)?;
        }
        DocumentCommands::Get { id } => {
            let doc = client
                .get_document(&id)
                .await
                .context("failed to get document")?;

            if out.is_json() {
                return out.render_json(&doc);
            }

            out.render_text(format_args!("{} {}\n", "Document:".bold(), doc.filename.cyan()))?;
            out.render_text(format_args!("  ID:        {}\n", doc.id))?;
            out.render_text(format_args!("  Device:    {}\n", doc.device_id))?;
            out.render_text(format_args!("  Path:      {}\n", doc.path))?;
            out.render_text(format_args!("  Type:      {}\n", doc.mime_type))?;
            out.render_text(format_args!("  Size:      {}\n", format_size(doc.size_bytes)))?;
            out.render_text(format_args!(
                "  Checksum:  {}\n",
                abbreviate_checksum(&doc.checksum)
            ))?;
            out.render_text(format_args!("  Indexed:   {}\n", doc.indexed_at))?;
        }
        DocumentCommands::Download { id, output } => {
            handle_download(client, &id, output.as_deref(), out).await?;
        }
    }

    Ok(())
}

async fn handle_download<W: Write>(
    client: &ManualsClient,
    id: &str,
    output: Option<&Path>,
    out: &mut Renderer<W>,
) -> Result<()> {
    let doc = client
        .get_document(id)
        .await
        .context("failed to get document info")?;

    let download = client
        .download_document(id)
        .await
        .context("failed to download document")?;

    let suggested = download
        .suggested_filename()
        .map(str::to_string)
        .or_else(|| base_name(&doc.filename));

    let path = resolve_output_path(output, suggested.as_deref())?;
    let filename = suggested
        .or_else(|| base_name(&path.to_string_lossy()))
        .unwrap_or_else(|| path.display().to_string());

    if let Some(expected) = download.content_length() {
        tracing::debug!("Downloading {} bytes to {}", expected, path.display());
    }

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(ManualsError::from)
        .with_context(|| format!("failed to create output file {}", path.display()))?;

    let result = download.copy_to(&mut file).await;
    drop(file);

    let written = match result {
        Ok(written) => written,
        Err(err) => {
            // Don't leave a truncated file behind
            let _ = tokio::fs::remove_file(&path).await;
            let context = match err {
                ManualsError::Filesystem(_) => "failed to write file",
                _ => "failed to download document",
            };
            return Err(anyhow::Error::new(err).context(context));
        }
    };

    if out.is_json() {
        return out.render_json(&serde_json::json!({
            "id": doc.id,
            "filename": filename,
            "path": path,
            "size_bytes": written,
        }));
    }

    out.print_line(&format_success(&format!(
        "Downloaded {} ({}) to {}",
        filename,
        format_size(written),
        path.display()
    )))?;

    Ok(())
}

/// Handle config commands
pub fn handle_config<W: Write>(
    command: ConfigCommands,
    current_config: &CliConfig,
    config_path: Option<&Path>,
    out: &mut Renderer<W>,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let source = current_config
                .config_file
                .as_ref()
                .map(|p| p.display().to_string());

            if out.is_json() {
                return out.render_json(&serde_json::json!({
                    "api_url": current_config.api_url,
                    "api_key": current_config.masked_api_key(),
                    "output_format": out.format(),
                    "config_file": source,
                }));
            }

            let rows = vec![
                vec!["API URL".to_string(), current_config.api_url.clone()],
                vec!["API Key".to_string(), current_config.masked_api_key()],
                vec!["Output Format".to_string(), out.format().to_string()],
                vec![
                    "Config File".to_string(),
                    source.unwrap_or_else(|| "(none)".to_string()),
                ],
            ];
            out.render_table(&["SETTING", "VALUE"], &rows)?;
        }
        ConfigCommands::Set { key, value } => {
            let path = target_config_path(config_path)?;
            let mut file = FileConfig::load_or_default(&path)?;

            let shown = if key == "api_key" {
                "(hidden)".to_string()
            } else {
                value.clone()
            };
            file.set(&key, value)?;
            file.save(&path)?;

            out.print_line(&format_success(&format!(
                "Set {} = {} in {}",
                key,
                shown,
                path.display()
            )))?;
        }
        ConfigCommands::Reset => {
            let path = target_config_path(config_path)?;
            FileConfig::default().save(&path)?;
            out.print_line(&format_success(&format!(
                "Configuration reset to defaults in {}",
                path.display()
            )))?;
        }
    }

    Ok(())
}

/// Handle version command
pub fn handle_version<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "manuals version {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        out,
        "  commit: {}",
        option_env!("MANUALS_GIT_COMMIT").unwrap_or("unknown")
    )?;
    writeln!(
        out,
        "  built:  {}",
        option_env!("MANUALS_BUILD_TIME").unwrap_or("unknown")
    )?;
    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

fn print_pagination_hint<P: Page, W: Write>(page: &P, out: &mut Renderer<W>) -> Result<()> {
    if let Some(next) = page.next_offset() {
        out.render_text(format_args!(
            "\nUse --offset {} to see more results.\n",
            next
        ))?;
    }
    Ok(())
}

fn abbreviate_checksum(checksum: &str) -> String {
    if checksum.len() > 16 && checksum.is_char_boundary(16) {
        format!("{}...", &checksum[..16])
    } else {
        checksum.to_string()
    }
}

fn base_name(filename: &str) -> Option<String> {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Destination for a download: `output` itself, or `output/filename` when
/// `output` is an existing directory, or `filename` in the working directory.
///
/// A filename is only needed when `output` is absent or a directory.
fn resolve_output_path(
    output: Option<&Path>,
    filename: Option<&str>,
) -> manuals_core::Result<PathBuf> {
    let require_filename = || {
        filename.ok_or_else(|| {
            ManualsError::validation(
                "server did not provide a filename, pass --output with a file path",
            )
        })
    };

    match output {
        Some(path) if path.is_dir() => Ok(path.join(require_filename()?)),
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(PathBuf::from(require_filename()?)),
    }
}

fn target_config_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => CliConfig::user_config_path(),
    }
}
