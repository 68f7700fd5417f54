//! The `fetch` subcommand: one report page, located and parsed, nothing
//! stored. Useful for checking a new entity code or a layout change.

use anyhow::Result;
use clap::Args;
use tceprest_lib::tceprest_portal::TableLocator;
use tceprest_lib::{validation, ReportClient};

use crate::output::{print_raw_rows, OutputFormat};

#[derive(Args)]
pub struct FetchArgs {
    /// Portal report code (e.g. 17 or 017)
    #[arg(long)]
    pub code: String,

    /// Report year (2000-2100)
    #[arg(long)]
    pub year: i32,

    /// Override the portal base URL
    #[arg(long, env = "TCEPREST_BASE_URL")]
    pub base_url: Option<String>,
}

pub async fn run(args: &FetchArgs, format: &OutputFormat) -> Result<()> {
    let code = validation::validate_report_code(&args.code)?;
    let year = validation::validate_year(args.year)?;

    let client = match args.base_url.as_deref() {
        Some(url) => ReportClient::with_base_url(url)?,
        None => ReportClient::new()?,
    };
    let locator = TableLocator::new()?;

    let body = client.fetch_report(code, year).await?;
    let rows = locator.parse_report(&body)?;
    eprintln!("{} rows in the report table for {} / {}", rows.len(), code, year);
    print_raw_rows(&rows, format)?;
    Ok(())
}
