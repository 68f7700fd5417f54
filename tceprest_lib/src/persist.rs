//! Writing a run's rows to the result store.
//!
//! One bulk insert per run. If it fails the rows are retried one at a time so
//! a single bad row does not cost the whole batch.

use serde::Serialize;

use crate::store::{ResultStore, StoreError, StoredRow};
use crate::types::ReportRow;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub extracted: usize,
    pub inserted: usize,
    /// The bulk insert failed and every row went through the per-row path.
    pub degraded: bool,
}

/// The store did not take every extracted row.
#[derive(thiserror::Error, Debug)]
#[error("stored {inserted} of {extracted} extracted rows: {source}")]
pub struct PersistFailure {
    pub extracted: usize,
    pub inserted: usize,
    /// The bulk insert error.
    pub source: StoreError,
}

pub fn persist(store: &dyn ResultStore, rows: &[ReportRow]) -> Result<PersistReport, PersistFailure> {
    let extracted = rows.len();
    if rows.is_empty() {
        return Ok(PersistReport {
            extracted,
            inserted: 0,
            degraded: false,
        });
    }

    let stored: Vec<StoredRow> = rows.iter().map(StoredRow::from).collect();
    let bulk_err = match store.insert_many(&stored) {
        Ok(inserted) => {
            tracing::info!("Stored {} rows", inserted);
            return Ok(PersistReport {
                extracted,
                inserted,
                degraded: false,
            });
        }
        Err(e) => e,
    };

    tracing::warn!(
        "Bulk insert of {} rows failed ({}), falling back to single inserts",
        extracted,
        bulk_err
    );

    let mut inserted = 0;
    for row in &stored {
        match store.insert_one(row) {
            Ok(()) => inserted += 1,
            Err(e) => tracing::warn!(
                "Could not store {} / {} row for {}: {}",
                row.report_code,
                row.month,
                row.entity_name,
                e
            ),
        }
    }

    if inserted == extracted {
        Ok(PersistReport {
            extracted,
            inserted,
            degraded: true,
        })
    } else {
        Err(PersistFailure {
            extracted,
            inserted,
            source: bulk_err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::types::EntityRef;
    use tceprest_portal::ReportCode;

    /// Store double: bulk inserts can be forced to fail, single inserts fail
    /// for the listed months.
    #[derive(Default)]
    struct FlakyStore {
        fail_bulk: bool,
        reject_months: Vec<&'static str>,
        bulk_calls: RefCell<usize>,
        stored: RefCell<Vec<StoredRow>>,
    }

    impl ResultStore for FlakyStore {
        fn insert_many(&self, rows: &[StoredRow]) -> Result<usize, StoreError> {
            *self.bulk_calls.borrow_mut() += 1;
            if self.fail_bulk {
                return Err(StoreError::Unavailable("bulk rejected".into()));
            }
            self.stored.borrow_mut().extend_from_slice(rows);
            Ok(rows.len())
        }

        fn insert_one(&self, row: &StoredRow) -> Result<(), StoreError> {
            if self.reject_months.contains(&row.month.as_str()) {
                return Err(StoreError::Unavailable(format!("row {} rejected", row.month)));
            }
            self.stored.borrow_mut().push(row.clone());
            Ok(())
        }
    }

    fn rows(months: &[&str]) -> Vec<ReportRow> {
        let entity = EntityRef {
            id: 2,
            name: "Caucaia".to_string(),
            report_code: ReportCode::new(37),
        };
        months
            .iter()
            .map(|m| ReportRow {
                entity: entity.clone(),
                month: m.to_string(),
                deadline_date: None,
                delivery_date_raw: Some("01/02/2024".to_string()),
                delivery_date: Some("2024-02-01".to_string()),
                status: None,
                budget_unit: Some("Prefeitura".to_string()),
                year: 2024,
            })
            .collect()
    }

    #[test]
    fn bulk_success() {
        let store = FlakyStore::default();
        let report = persist(&store, &rows(&["Janeiro", "Fevereiro"])).unwrap();
        assert_eq!(
            report,
            PersistReport {
                extracted: 2,
                inserted: 2,
                degraded: false
            }
        );
        assert_eq!(*store.bulk_calls.borrow(), 1);
        assert_eq!(store.stored.borrow()[0].report_code, "037");
    }

    #[test]
    fn empty_input_skips_store() {
        let store = FlakyStore::default();
        let report = persist(&store, &[]).unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(*store.bulk_calls.borrow(), 0);
    }

    #[test]
    fn bulk_failure_recovered_row_by_row() {
        let store = FlakyStore {
            fail_bulk: true,
            ..Default::default()
        };
        let report = persist(&store, &rows(&["Janeiro", "Fevereiro", "Março"])).unwrap();
        assert!(report.degraded);
        assert_eq!(report.inserted, 3);
        assert_eq!(store.stored.borrow().len(), 3);
    }

    #[test]
    fn partial_fallback_surfaces_failure_with_counts() {
        let store = FlakyStore {
            fail_bulk: true,
            reject_months: vec!["Fevereiro"],
            ..Default::default()
        };
        let failure = persist(&store, &rows(&["Janeiro", "Fevereiro", "Março"])).unwrap_err();
        assert_eq!(failure.extracted, 3);
        assert_eq!(failure.inserted, 2);
        assert!(matches!(failure.source, StoreError::Unavailable(_)));
        assert_eq!(
            failure.to_string(),
            "stored 2 of 3 extracted rows: store unavailable: bulk rejected"
        );
    }
}
