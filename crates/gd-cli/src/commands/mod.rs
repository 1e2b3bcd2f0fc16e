//! CLI command definitions and dispatch.

pub mod build;
pub mod comparators;

use std::path::Path;

use clap::{Parser, Subcommand};
use gd_core::config::AppConfig;
use gd_filters::ComparatorTable;

/// godata-query: build Go.Data REST filters from list screen definitions
#[derive(Debug, Parser)]
#[command(name = "godata-query", version, about, long_about = None)]
pub struct Cli {
    /// Comparator table overriding the configured one (YAML or JSON)
    #[arg(long, global = true)]
    pub comparator_table: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a screen's saved filters and print the request filter
    Build(build::BuildArgs),
    /// Print the comparators each filter type offers
    Comparators(comparators::ComparatorsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let table = load_table(self.comparator_table.as_deref(), config)?;
        match &self.command {
            Commands::Build(args) => build::execute(args, config, table).await,
            Commands::Comparators(args) => comparators::execute(args, &table),
        }
    }
}

/// Helper: comparator table from the command line, the configuration or the standard one
fn load_table(path: Option<&str>, config: &AppConfig) -> anyhow::Result<ComparatorTable> {
    match path.or(config.filters.comparator_table_path.as_deref()) {
        Some(path) => {
            tracing::info!(path, "using comparator table override");
            Ok(ComparatorTable::load(Path::new(path))?)
        }
        None => Ok(ComparatorTable::standard()),
    }
}
