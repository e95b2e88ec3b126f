//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use karotz_core::ConnectionStatus;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

const MAX_CELL_WIDTH: usize = 60;

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Status word, colored when `color` is set.
pub fn status_label(status: ConnectionStatus, color: bool) -> String {
    let text = status.to_string();
    if !color {
        return text;
    }
    match status {
        ConnectionStatus::Connected => text.green().to_string(),
        ConnectionStatus::Degraded => text.yellow().to_string(),
        ConnectionStatus::Unavailable => text.red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render rows in the chosen format.
///
/// `table` goes through `to_row`; `plain` prints `id_fn` of each item.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(data.iter().map(id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render one item. Table mode uses `detail_fn` for a pre-formatted view.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// Print to stdout unless quiet.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(render_err)?,
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(render_err)?,
        _ => serde_json::to_string_pretty(data).map_err(render_err)?,
    };
    Ok(rendered.trim_end().to_owned())
}

fn render_err(e: impl std::fmt::Display) -> CliError {
    CliError::Render(e.to_string())
}

/// Compact JSON for a table cell, cut to a readable width.
pub fn cell(value: &serde_json::Value) -> String {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
    cut.push('…');
    cut
}
