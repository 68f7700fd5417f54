//! The extraction engine: walk the active roster, fetch each entity's
//! report page, and turn its table into filtered [`ReportRow`]s.
//!
//! Entities are processed strictly one after another. A failure for one
//! entity is recorded as its outcome and never stops the run.

use serde::Serialize;
use tceprest_portal::{LayoutError, ReportClient, TableLocator};

use crate::cancel::CancelToken;
use crate::error::{RunError, TceprestError};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::rate_limiter::RateLimiter;
use crate::store::Registry;
use crate::types::{Entity, ExtractionOutcome, ReportRow, RunFilter};

/// Everything one run produced before persistence.
#[derive(Debug, Default, Serialize)]
pub struct Extraction {
    pub rows: Vec<ReportRow>,
    pub outcomes: Vec<ExtractionOutcome>,
    /// The run stopped early on a cancellation request. `outcomes` covers
    /// only the entities visited before that.
    pub cancelled: bool,
}

impl Extraction {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

pub struct Extractor<'a> {
    registry: &'a dyn Registry,
    client: &'a ReportClient,
    limiter: &'a RateLimiter,
    locator: TableLocator,
}

impl<'a> Extractor<'a> {
    pub fn new(
        registry: &'a dyn Registry,
        client: &'a ReportClient,
        limiter: &'a RateLimiter,
    ) -> Result<Self, TceprestError> {
        Ok(Self {
            registry,
            client,
            limiter,
            locator: TableLocator::new()?,
        })
    }

    /// Run one pass over the active roster.
    ///
    /// Only a registry failure aborts. The sink receives a start line and a
    /// terminal line per visited entity; it is not finished here.
    pub async fn extract(
        &self,
        filter: &RunFilter,
        sink: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<Extraction, RunError> {
        let entities = self.registry.list_active().map_err(RunError::Registry)?;
        tracing::info!(
            "Extracting {} for {} active entities",
            filter.year,
            entities.len()
        );

        let mut extraction = Extraction::default();

        for entity in &entities {
            if cancel.is_cancelled() {
                extraction.cancelled = true;
                break;
            }

            // The wait can be long; a cancel during it must not reach the portal.
            self.limiter.acquire().await;
            if cancel.is_cancelled() {
                extraction.cancelled = true;
                break;
            }

            sink.emit(ProgressEvent::Started {
                entity: entity.display_name.clone(),
            });
            let outcome = match self.extract_entity(entity, filter).await {
                Ok(rows) => {
                    let outcome = ExtractionOutcome::succeeded(entity.entity_ref(), rows.len());
                    extraction.rows.extend(rows);
                    outcome
                }
                Err(reason) => {
                    tracing::warn!(
                        "{} ({}) - {}",
                        entity.display_name,
                        entity.report_code,
                        reason
                    );
                    ExtractionOutcome::failed(entity.entity_ref(), reason)
                }
            };

            sink.emit(terminal_event(&outcome));
            extraction.outcomes.push(outcome);
        }

        if extraction.cancelled {
            tracing::warn!(
                "Extraction cancelled after {} of {} entities",
                extraction.outcomes.len(),
                entities.len()
            );
        }
        tracing::info!(
            "Extraction finished: {} rows, {} ok, {} failed",
            extraction.rows.len(),
            extraction.succeeded(),
            extraction.failed()
        );
        Ok(extraction)
    }

    /// Fetch and parse one entity. The error is the human-readable failure
    /// reason recorded in the outcome.
    async fn extract_entity(
        &self,
        entity: &Entity,
        filter: &RunFilter,
    ) -> Result<Vec<ReportRow>, String> {
        let tracker = self.limiter.tracker();
        let body = match self.client.fetch_report(entity.report_code, filter.year).await {
            Ok(body) => {
                tracker.record_success();
                body
            }
            Err(e) => {
                tracker.record_failure();
                return Err(e.to_string());
            }
        };

        let raw_rows = self
            .locator
            .parse_report(&body)
            .map_err(|e: LayoutError| e.to_string())?;

        let entity_ref = entity.entity_ref();
        Ok(raw_rows
            .iter()
            .filter_map(|raw| ReportRow::from_raw(&entity_ref, filter.year, raw))
            .filter(|row| filter.accepts(row))
            .collect())
    }
}

fn terminal_event(outcome: &ExtractionOutcome) -> ProgressEvent {
    let entity = outcome.entity.name.clone();
    match outcome.failure {
        Some(ref reason) => ProgressEvent::Failed {
            entity,
            reason: reason.clone(),
        },
        None if outcome.rows == 0 => ProgressEvent::NoRows { entity },
        None => ProgressEvent::Succeeded {
            entity,
            rows: outcome.rows,
        },
    }
}
