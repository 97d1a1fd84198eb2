//! Output formatting: table, JSON, YAML, plain.
//!
//! The service returns free-form JSON, so every renderer works on a
//! `serde_json::Value`. Table lists the top-level fields, structured
//! formats use serde, plain emits just the identifier.

use std::io::{self, IsTerminal, Write};

use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render a response body in the chosen format.
///
/// `plain_id` is what `plain` prints; when `None` the body is printed
/// compactly instead.
pub fn render_value(
    format: &OutputFormat,
    data: &Value,
    plain_id: Option<&str>,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Table => render_table(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => match plain_id {
            Some(id) => id.to_owned(),
            None => serde_json::to_string(data)?,
        },
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table(data: &Value) -> String {
    match data {
        Value::Null => "(empty response)".into(),
        Value::Object(map) => {
            let rows: Vec<FieldRow> = map
                .iter()
                .map(|(field, value)| FieldRow {
                    field: field.clone(),
                    value: scalar_text(value),
                })
                .collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        other => scalar_text(other),
    }
}

/// Strings without quotes; everything else as compact JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
