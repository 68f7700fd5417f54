//! Extraction followed by persistence: the unit a caller triggers.

use serde::Serialize;
use tceprest_portal::ReportClient;

use crate::cancel::CancelToken;
use crate::error::{RunError, TceprestError};
use crate::extract::{Extraction, Extractor};
use crate::persist::{persist, PersistReport};
use crate::progress::ProgressSink;
use crate::rate_limiter::RateLimiter;
use crate::store::{Registry, ResultStore};
use crate::types::RunFilter;

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub extraction: Extraction,
    pub persisted: PersistReport,
}

/// Wires the collaborators together for a run. The registry and store are
/// borrowed; their lifecycle belongs to the caller.
pub struct Pipeline<'a> {
    extractor: Extractor<'a>,
    store: &'a dyn ResultStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        registry: &'a dyn Registry,
        client: &'a ReportClient,
        limiter: &'a RateLimiter,
        store: &'a dyn ResultStore,
    ) -> Result<Self, TceprestError> {
        Ok(Self {
            extractor: Extractor::new(registry, client, limiter)?,
            store,
        })
    }

    /// Extract the whole roster, then store every collected row in one batch.
    ///
    /// Rows from a partially failed or cancelled extraction are still
    /// stored. The sink is finished on every path, including errors.
    pub async fn run(
        &self,
        filter: &RunFilter,
        sink: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<RunSummary, RunError> {
        let extraction = match self.extractor.extract(filter, sink, cancel).await {
            Ok(extraction) => extraction,
            Err(e) => {
                sink.finish();
                return Err(e);
            }
        };

        let result = match persist(self.store, &extraction.rows) {
            Ok(persisted) => Ok(RunSummary {
                extraction,
                persisted,
            }),
            Err(failure) => {
                tracing::error!("{}", failure);
                Err(RunError::Persistence {
                    extraction: Box::new(extraction),
                    failure,
                })
            }
        };
        sink.finish();
        result
    }
}
