//! The `extract` subcommand: run the pipeline over the active roster and
//! store the rows in SQLite.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tceprest_lib::{
    validation, BufferedProgress, CancelToken, Extraction, PersistReport, Pipeline,
    ProgressMessage, RateLimiter, ReportClient, RunError, StreamedProgress,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::commands::open_db;
use crate::output::{print_outcomes, print_run_json, OutputFormat};

/// Marker printed after the last streamed progress line.
const END_MARKER: &str = "[END]";

/// Arguments for the `extract` subcommand.
#[derive(Args)]
pub struct ExtractArgs {
    /// Report year (2000-2100)
    #[arg(long)]
    pub year: i32,

    /// Month filter: a number (1-12) or a month name (e.g. Março)
    #[arg(long)]
    pub month: Option<String>,

    /// Only keep rows delivered on this date (YYYY-MM-DD)
    #[arg(long)]
    pub delivery_date: Option<String>,

    /// Print each progress line as it happens, ending with [END]
    #[arg(long)]
    pub stream: bool,

    /// Override the portal base URL
    #[arg(long, env = "TCEPREST_BASE_URL")]
    pub base_url: Option<String>,

    /// Delay between portal requests in milliseconds
    #[arg(long, env = "TCEPREST_DELAY_MS", default_value = "2000")]
    pub delay_ms: u64,
}

pub async fn run(args: &ExtractArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let filter = validation::build_filter(
        args.year,
        args.month.as_deref(),
        args.delivery_date.as_deref(),
    )?;

    let db = open_db(db_path)?;
    let client = match args.base_url.as_deref() {
        Some(url) => ReportClient::with_base_url(url)?,
        None => ReportClient::new()?,
    };
    let limiter = RateLimiter::fixed_delay(Duration::from_millis(args.delay_ms));
    let pipeline = Pipeline::new(&db, &client, &limiter, &db)?;

    let cancel = CancelToken::new();
    spawn_interrupt_handler(cancel.clone());

    eprintln!(
        "Starting extraction for {} into {} (one request every {} ms)",
        filter.year,
        db_path.display(),
        limiter.delay().as_millis()
    );

    let (result, lines) = if args.stream {
        let (mut sink, rx) = StreamedProgress::channel();
        let printer = tokio::spawn(print_stream(rx));
        let result = pipeline.run(&filter, &mut sink, &cancel).await;
        drop(sink);
        printer.await?;
        (result, None)
    } else {
        let mut progress = BufferedProgress::new();
        let result = pipeline.run(&filter, &mut progress, &cancel).await;
        (result, Some(progress.into_lines()))
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(RunError::Persistence {
            extraction,
            failure,
        }) => {
            // Streamed runs already delivered every line; buffered ones still owe
            // the caller the per-entity results.
            if let Some(lines) = &lines {
                report(lines, &extraction, None, format)?;
            }
            eprintln!(
                "Extraction finished ({} entities, {} rows) but storing failed",
                extraction.outcomes.len(),
                extraction.rows.len()
            );
            return Err(failure.into());
        }
        Err(e) => return Err(e.into()),
    };

    db.set_meta("last_run_at", &chrono::Utc::now().to_rfc3339())?;
    db.set_meta("last_run_year", &filter.year.to_string())?;

    if let Some(lines) = &lines {
        report(
            lines,
            &summary.extraction,
            Some(&summary.persisted),
            format,
        )?;
    }

    let tracker = limiter.tracker().summary();
    eprintln!(
        "Extraction complete: {} rows stored, {} entities ok, {} failed ({} requests){}",
        summary.persisted.inserted,
        summary.extraction.succeeded(),
        summary.extraction.failed(),
        tracker.requests_made,
        if summary.extraction.cancelled {
            ", cancelled"
        } else {
            ""
        }
    );
    Ok(())
}

/// Buffered-mode result: progress lines plus outcomes. `persisted` is `None`
/// when storing failed.
fn report(
    lines: &[String],
    extraction: &Extraction,
    persisted: Option<&PersistReport>,
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_run_json(lines, extraction, persisted),
        _ => {
            for line in lines {
                println!("{}", line);
            }
            print_outcomes(&extraction.outcomes, format)?;
        }
    }
    Ok(())
}

async fn print_stream(mut rx: UnboundedReceiver<ProgressMessage>) {
    while let Some(message) = rx.recv().await {
        match message {
            ProgressMessage::Line(line) => println!("{}", line),
            ProgressMessage::End => {
                println!("{}", END_MARKER);
                break;
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum InterruptAction {
    /// Stop before the next portal request; rows so far are still stored.
    Cancel,
    /// Leave now, even mid-request.
    Exit,
}

fn interrupt_action(previous_interrupts: usize) -> InterruptAction {
    if previous_interrupts == 0 {
        InterruptAction::Cancel
    } else {
        InterruptAction::Exit
    }
}

/// Exit status for a run killed by a second Ctrl-C (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        let mut seen = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            match interrupt_action(seen) {
                InterruptAction::Cancel => {
                    eprintln!(
                        "Interrupt received, stopping before the next request (Ctrl-C again to quit now)"
                    );
                    cancel.cancel();
                }
                InterruptAction::Exit => {
                    eprintln!("Second interrupt, exiting without storing rows");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
            seen += 1;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_interrupt_cancels_second_exits() {
        assert_eq!(interrupt_action(0), InterruptAction::Cancel);
        assert_eq!(interrupt_action(1), InterruptAction::Exit);
        assert_eq!(interrupt_action(5), InterruptAction::Exit);
    }
}
