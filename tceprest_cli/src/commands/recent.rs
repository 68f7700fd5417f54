//! The `recent` subcommand: the latest stored rows, newest first.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use tceprest_lib::validation;

use crate::commands::open_db;
use crate::output::{print_stored_rows, OutputFormat};

#[derive(Args)]
pub struct RecentArgs {
    /// Maximum number of rows to show (1-1000)
    #[arg(long, default_value_t = validation::DEFAULT_RECENT_LIMIT)]
    pub limit: i64,
}

pub fn run(args: &RecentArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let limit = validation::validate_limit(args.limit)?;
    let db = open_db(db_path)?;
    let rows = db.recent_rows(limit)?;
    print_stored_rows(&rows, format)?;
    Ok(())
}
