use anyhow::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tceprest_lib::db::DbReportRow;
use tceprest_lib::tceprest_portal::RawReportRow;
use tceprest_lib::{Entity, Extraction, ExtractionOutcome, PersistReport};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct OutcomeRow {
    #[tabled(rename = "Code")]
    #[serde(rename = "Code")]
    code: String,
    #[tabled(rename = "Entity")]
    #[serde(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Rows")]
    #[serde(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "Result")]
    #[serde(rename = "Result")]
    result: String,
}

#[derive(Tabled, Serialize)]
struct EntityRow {
    #[tabled(rename = "Code")]
    #[serde(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    #[serde(rename = "Active")]
    active: String,
}

#[derive(Tabled, Serialize)]
struct StoredRowView {
    #[tabled(rename = "Code")]
    #[serde(rename = "Code")]
    code: String,
    #[tabled(rename = "Entity")]
    #[serde(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Year")]
    #[serde(rename = "Year")]
    year: i32,
    #[tabled(rename = "Month")]
    #[serde(rename = "Month")]
    month: String,
    #[tabled(rename = "Deadline")]
    #[serde(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Delivered")]
    #[serde(rename = "Delivered")]
    delivered: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Budget Unit")]
    #[serde(rename = "Budget Unit")]
    budget_unit: String,
}

#[derive(Tabled, Serialize)]
struct RawRowView {
    #[tabled(rename = "Month")]
    #[serde(rename = "Month")]
    month: String,
    #[tabled(rename = "Deadline")]
    #[serde(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Delivered")]
    #[serde(rename = "Delivered")]
    delivered: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Budget Unit")]
    #[serde(rename = "Budget Unit")]
    budget_unit: String,
}

/// Buffered extraction result as printed with `--output json`. `persisted`
/// is null when storing failed.
#[derive(Serialize)]
struct RunReport<'a> {
    progress: &'a [String],
    extraction: &'a Extraction,
    persisted: Option<&'a PersistReport>,
}

// -- Row builders --

fn build_outcome_rows(outcomes: &[ExtractionOutcome]) -> Vec<OutcomeRow> {
    outcomes
        .iter()
        .map(|o| OutcomeRow {
            code: o.entity.report_code.to_string(),
            entity: o.entity.name.clone(),
            rows: o.rows,
            result: match &o.failure {
                Some(reason) => format!("failed: {}", reason),
                None => "ok".to_string(),
            },
        })
        .collect()
}

fn build_entity_rows(entities: &[Entity]) -> Vec<EntityRow> {
    entities
        .iter()
        .map(|e| EntityRow {
            code: e.report_code.to_string(),
            name: e.display_name.clone(),
            active: if e.active { "yes" } else { "no" }.to_string(),
        })
        .collect()
}

fn build_stored_rows(rows: &[DbReportRow]) -> Vec<StoredRowView> {
    rows.iter()
        .map(|r| StoredRowView {
            code: r.report_code.clone(),
            entity: r.entity_name.clone(),
            year: r.year,
            month: r.month.clone(),
            deadline: r.deadline_date.clone().unwrap_or_default(),
            delivered: r
                .delivery_date
                .clone()
                .or_else(|| r.delivery_date_raw.clone())
                .unwrap_or_default(),
            status: r.status.clone().unwrap_or_default(),
            budget_unit: r.budget_unit.clone().unwrap_or_default(),
        })
        .collect()
}

fn build_raw_rows(rows: &[RawReportRow]) -> Vec<RawRowView> {
    rows.iter()
        .map(|r| RawRowView {
            month: r.month.clone(),
            deadline: r.deadline.clone(),
            delivered: r.delivery.clone(),
            status: r.status.clone(),
            budget_unit: r.budget_unit.clone(),
        })
        .collect()
}

// -- Printing --

fn print_rows<T: Tabled + Serialize>(rows: &[T], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

pub fn print_outcomes(outcomes: &[ExtractionOutcome], format: &OutputFormat) -> Result<()> {
    print_rows(&build_outcome_rows(outcomes), format)
}

pub fn print_entities(entities: &[Entity], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(&entities);
            Ok(())
        }
        _ => print_rows(&build_entity_rows(entities), format),
    }
}

pub fn print_stored_rows(rows: &[DbReportRow], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(&rows);
            Ok(())
        }
        _ => print_rows(&build_stored_rows(rows), format),
    }
}

pub fn print_raw_rows(rows: &[RawReportRow], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(&rows);
            Ok(())
        }
        _ => print_rows(&build_raw_rows(rows), format),
    }
}

pub fn print_run_json(
    progress: &[String],
    extraction: &Extraction,
    persisted: Option<&PersistReport>,
) {
    print_json(&RunReport {
        progress,
        extraction,
        persisted,
    });
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
