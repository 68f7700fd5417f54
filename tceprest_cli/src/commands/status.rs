//! The `status` subcommand.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::commands::open_db;
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct StatusReport {
    database: String,
    entities: usize,
    active_entities: usize,
    rows: i64,
    last_run_at: Option<String>,
    last_run_year: Option<String>,
}

pub fn run(db_path: &Path, format: &OutputFormat) -> Result<()> {
    let db = open_db(db_path)?;
    let entities = db.list_entities(false)?;

    let report = StatusReport {
        database: db_path.display().to_string(),
        active_entities: entities.iter().filter(|e| e.active).count(),
        entities: entities.len(),
        rows: db.row_count()?,
        last_run_at: db.get_meta("last_run_at")?,
        last_run_year: db.get_meta("last_run_year")?,
    };

    match format {
        OutputFormat::Json => print_json(&report),
        _ => {
            println!("Database:        {}", report.database);
            println!(
                "Entities:        {} ({} active)",
                report.entities, report.active_entities
            );
            println!("Stored rows:     {}", report.rows);
            println!(
                "Last run:        {}",
                match (&report.last_run_at, &report.last_run_year) {
                    (Some(at), Some(year)) => format!("{} (year {})", at, year),
                    (Some(at), None) => at.clone(),
                    _ => "never".to_string(),
                }
            );
        }
    }
    Ok(())
}
