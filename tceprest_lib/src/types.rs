//! Domain records flowing through an extraction run.

use serde::Serialize;
use tceprest_portal::normalize::{normalize, parse_local_date_to_iso};
use tceprest_portal::{RawReportRow, ReportCode};

/// A registered reporting unit (a municipality or one of its bodies).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: i64,
    pub display_name: String,
    pub report_code: ReportCode,
    pub active: bool,
}

impl Entity {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id,
            name: self.display_name.clone(),
            report_code: self.report_code,
        }
    }
}

/// The parts of an [`Entity`] carried by rows and outcomes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub id: i64,
    pub name: String,
    pub report_code: ReportCode,
}

/// One normalized row of an entity's compliance report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub entity: EntityRef,
    pub month: String,
    pub deadline_date: Option<String>,
    pub delivery_date_raw: Option<String>,
    /// `delivery_date_raw` re-emitted as `YYYY-MM-DD` when it holds a
    /// `DD/MM/YYYY` date.
    pub delivery_date: Option<String>,
    pub status: Option<String>,
    pub budget_unit: Option<String>,
    pub year: i32,
}

impl ReportRow {
    /// Normalize a raw table row. Rows whose month cell is blank are dropped.
    pub fn from_raw(entity: &EntityRef, year: i32, raw: &RawReportRow) -> Option<Self> {
        let month = normalize(&raw.month)?;
        let delivery_date_raw = normalize(&raw.delivery);
        let delivery_date = delivery_date_raw
            .as_deref()
            .and_then(parse_local_date_to_iso);
        Some(Self {
            entity: entity.clone(),
            month,
            deadline_date: normalize(&raw.deadline),
            delivery_date_raw,
            delivery_date,
            status: normalize(&raw.status),
            budget_unit: normalize(&raw.budget_unit),
            year,
        })
    }
}

/// Per-entity result of one run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractionOutcome {
    pub entity: EntityRef,
    pub rows: usize,
    pub failure: Option<String>,
}

impl ExtractionOutcome {
    pub fn succeeded(entity: EntityRef, rows: usize) -> Self {
        Self {
            entity,
            rows,
            failure: None,
        }
    }

    pub fn failed(entity: EntityRef, reason: impl Into<String>) -> Self {
        Self {
            entity,
            rows: 0,
            failure: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// What a run extracts: the year, plus optional month and delivery-date
/// restrictions. Build one through [`crate::validation`] helpers or directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunFilter {
    pub year: i32,
    /// Month label matched case-insensitively as a substring of the month
    /// column, e.g. `Março` for an input of `3`.
    pub month: Option<String>,
    /// `YYYY-MM-DD`; compared for equality with the parsed delivery date.
    pub delivery_date: Option<String>,
}

impl RunFilter {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            month: None,
            delivery_date: None,
        }
    }

    pub fn with_month(mut self, label: impl Into<String>) -> Self {
        self.month = Some(label.into());
        self
    }

    pub fn with_delivery_date(mut self, iso: impl Into<String>) -> Self {
        self.delivery_date = Some(iso.into());
        self
    }

    pub fn accepts(&self, row: &ReportRow) -> bool {
        if let Some(ref label) = self.month {
            if !row.month.to_lowercase().contains(&label.to_lowercase()) {
                return false;
            }
        }
        if let Some(ref iso) = self.delivery_date {
            if row.delivery_date.as_deref() != Some(iso.as_str()) {
                return false;
            }
        }
        true
    }
}
