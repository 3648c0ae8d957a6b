//! Output rendering for the CLI
//!
//! A [`Renderer`] writes already-fetched data as indented JSON, an aligned
//! table, or free text. The helpers [`truncate`] and [`format_size`] are pure.

use colored::*;
use serde::Serialize;
use std::fmt;
use std::io::{self, Stdout, Write};
use tabled::builder::Builder;
use tabled::settings::{Padding, Style};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Text,
}

impl OutputFormat {
    /// Parse a format name, case-insensitively.
    ///
    /// Unrecognized names fall back to [`OutputFormat::Table`].
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "text" => OutputFormat::Text,
            "table" => OutputFormat::Table,
            other => {
                tracing::debug!("Unknown output format '{}', using table", other);
                OutputFormat::Table
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes formatted output to a sink, stdout for the CLI.
#[derive(Debug)]
pub struct Renderer<W: Write = Stdout> {
    format: OutputFormat,
    out: W,
}

impl Renderer<Stdout> {
    /// Create a renderer writing to stdout.
    pub fn stdout(format: &str) -> Self {
        Self::new(format, io::stdout())
    }
}

impl<W: Write> Renderer<W> {
    /// Create a renderer writing to `out`. Unknown formats render as tables.
    pub fn new(format: &str, out: W) -> Self {
        Self {
            format: OutputFormat::parse_lenient(format),
            out,
        }
    }

    /// The configured output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether the output format is JSON.
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Consume the renderer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write `value` as JSON indented with two spaces, followed by a newline.
    pub fn render_json<T: Serialize + ?Sized>(&mut self, value: &T) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }

    /// Write a column-aligned table.
    ///
    /// Columns are separated by at least two spaces. The rule under the header
    /// is as long as the headers joined by two spaces. Rows keep their order.
    pub fn render_table<S: AsRef<str>>(
        &mut self,
        headers: &[&str],
        rows: &[Vec<S>],
    ) -> io::Result<()> {
        let mut builder = Builder::default();
        builder.push_record(headers.iter().map(|h| h.to_string()));
        for row in rows {
            builder.push_record(row.iter().map(|cell| cell.as_ref().to_string()));
        }

        let mut table = builder.build();
        table.with(Style::empty()).with(Padding::new(0, 2, 0, 0));
        let rendered = table.to_string();

        let rule = "-".repeat(headers.join("  ").len());
        for (i, line) in rendered.lines().enumerate() {
            writeln!(self.out, "{}", line.trim_end())?;
            if i == 0 {
                writeln!(self.out, "{}", rule)?;
            }
        }
        Ok(())
    }

    /// Write formatted text as is, use with `format_args!`.
    pub fn render_text(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(args)
    }

    /// Write a value followed by a newline.
    pub fn print_line<T: fmt::Display + ?Sized>(&mut self, line: &T) -> io::Result<()> {
        writeln!(self.out, "{}", line)
    }
}

/// Shorten `s` to at most `max_len` bytes.
///
/// Strings that fit are returned unchanged. For `max_len <= 3` the prefix is
/// returned without an ellipsis, otherwise the last three bytes are `...`.
/// A cut inside a multi-byte character moves back to the previous character
/// boundary, so the result can be shorter than `max_len` for non-ASCII input.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return prefix(s, max_len).to_string();
    }
    format!("{}...", prefix(s, max_len - 3))
}

fn prefix(s: &str, mut end: usize) -> &str {
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// First eight characters of an identifier.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Format a byte count with binary (1024-based) units: `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const SYMBOLS: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", bytes as f64 / div as f64, SYMBOLS[exp])
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
