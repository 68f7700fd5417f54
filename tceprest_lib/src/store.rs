//! Collaborator interfaces for the entity registry and the result store.
//!
//! The pipeline only talks to these traits; [`crate::db::Db`] is the bundled
//! SQLite implementation of both.

use serde::Serialize;

use crate::db::DbError;
use crate::types::{Entity, ReportRow};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] DbError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to the roster of reporting entities.
pub trait Registry {
    /// Active entities ordered by report code, ascending.
    fn list_active(&self) -> Result<Vec<Entity>, StoreError>;
}

/// Write access to the table of extracted report rows.
pub trait ResultStore {
    /// Insert every row in one call. Either all rows are stored or none.
    fn insert_many(&self, rows: &[StoredRow]) -> Result<usize, StoreError>;
    /// Insert a single row. Used when the bulk path fails.
    fn insert_one(&self, row: &StoredRow) -> Result<(), StoreError>;
}

/// Shape of a persisted report row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredRow {
    pub entity_id: i64,
    pub entity_name: String,
    pub report_code: String,
    pub month: String,
    pub deadline_date: Option<String>,
    /// ISO `YYYY-MM-DD`, or `None` when the portal text held no date.
    pub delivery_date: Option<String>,
    pub delivery_date_raw: Option<String>,
    pub status: Option<String>,
    pub budget_unit: Option<String>,
    pub year: i32,
}

impl From<&ReportRow> for StoredRow {
    fn from(row: &ReportRow) -> Self {
        Self {
            entity_id: row.entity.id,
            entity_name: row.entity.name.clone(),
            report_code: row.entity.report_code.to_string(),
            month: row.month.clone(),
            deadline_date: row.deadline_date.clone(),
            delivery_date: row.delivery_date.clone(),
            delivery_date_raw: row.delivery_date_raw.clone(),
            status: row.status.clone(),
            budget_unit: row.budget_unit.clone(),
            year: row.year,
        }
    }
}
