//! `build`: apply a screen's saved filters and print the request filter.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use gd_core::config::AppConfig;
use gd_core::OutbreakId;
use gd_filters::ComparatorTable;
use gd_lists::ListEndpoint;
use serde_json::json;

use crate::output::{self, QueryFormat};
use crate::screen::ScreenDefinition;

/// Arguments for the build command
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Screen definition file (YAML or JSON)
    #[arg(short, long)]
    pub screen: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = QueryFormat::QueryParam)]
    pub format: QueryFormat,

    /// Outbreak the urls are scoped to (url format)
    #[arg(long)]
    pub outbreak: Option<String>,

    /// Resource overriding the screen's one (url format)
    #[arg(long)]
    pub resource: Option<String>,
}

/// Execute the build command
pub async fn execute(args: &BuildArgs, config: &AppConfig, table: ComparatorTable) -> anyhow::Result<()> {
    let screen = ScreenDefinition::load(&args.screen).await?;
    let qb = screen.build_query(
        Arc::new(table),
        config.filters.text_case_insensitive,
        &config.lists.page_settings(),
    )?;

    match args.format {
        QueryFormat::QueryParam => println!("{}", qb.to_query_param()),
        QueryFormat::Json => output::print_json(&qb)?,
        QueryFormat::Body => output::print_json(&json!({ "filter": qb.build_query() }))?,
        QueryFormat::Url => {
            let resource = args
                .resource
                .clone()
                .or_else(|| screen.resource.clone())
                .context("no resource given and the screen declares none")?;
            let outbreak = args
                .outbreak
                .clone()
                .map(OutbreakId::new)
                .context("--outbreak is required for the url format")?;

            let endpoint = ListEndpoint::new(&config.api.base_url, resource)?;
            println!("{}", endpoint.list_url(&outbreak, &qb)?);
            println!("{}", endpoint.count_url(&outbreak, &qb)?);
        }
    }
    Ok(())
}
