//! Output formatting for CLI commands.

use serde::Serialize;

/// How a built query is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum QueryFormat {
    /// `filter=<url-encoded json>`
    #[default]
    QueryParam,
    /// Pretty-printed filter object
    Json,
    /// `{ "filter": ... }` body for export and bulk endpoints
    Body,
    /// List and count urls of the screen's resource
    Url,
}

/// Output format of listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain text
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
