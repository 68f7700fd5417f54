mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "tceprest")]
#[command(about = "Extract monthly accountability report status from the TCE-CE portal")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// SQLite database path
    #[arg(long, env = "TCEPREST_DB", default_value = "tceprest.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an extraction over every active entity and store the rows
    Extract(commands::extract::ExtractArgs),
    /// Manage the entity roster
    Entities(commands::entities::EntitiesArgs),
    /// Show the most recently stored rows
    Recent(commands::recent::RecentArgs),
    /// Fetch one entity's report page and print its rows without storing them
    Fetch(commands::fetch::FetchArgs),
    /// Show roster and row counts and the last run time
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tceprest=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "md" | "markdown" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    match &cli.command {
        Commands::Extract(args) => commands::extract::run(args, &cli.db, &format).await?,
        Commands::Entities(args) => commands::entities::run(args, &cli.db, &format)?,
        Commands::Recent(args) => commands::recent::run(args, &cli.db, &format)?,
        Commands::Fetch(args) => commands::fetch::run(args, &format).await?,
        Commands::Status => commands::status::run(&cli.db, &format)?,
    }

    Ok(())
}
