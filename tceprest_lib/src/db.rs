//! SQLite storage for the entity roster and extracted report rows.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tceprest_portal::ReportCode;

use crate::store::{Registry, ResultStore, StoreError, StoredRow};
use crate::types::Entity;

/// Schema version written to `PRAGMA user_version` after `init`.
pub const SCHEMA_VERSION: i32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub struct Db {
    conn: Connection,
}

/// A persisted report row as read back for display.
#[derive(Clone, Debug, Serialize)]
pub struct DbReportRow {
    pub id: i64,
    pub entity_name: String,
    pub report_code: String,
    pub month: String,
    pub deadline_date: Option<String>,
    pub delivery_date: Option<String>,
    pub delivery_date_raw: Option<String>,
    pub status: Option<String>,
    pub budget_unit: Option<String>,
    pub year: i32,
    pub extracted_at: String,
}

const INSERT_ROW_SQL: &str = "INSERT INTO report_rows (
       entity_id,
       entity_name,
       report_code,
       month,
       deadline_date,
       delivery_date,
       delivery_date_raw,
       status,
       budget_unit,
       year
     )
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), DbError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;

        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>, DbError> {
        self.conn
            .query_row(
                "SELECT value FROM ingest_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO ingest_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Register an entity, or rename/reactivate it if the code is known.
    /// Returns the entity id.
    pub fn upsert_entity(
        &self,
        code: ReportCode,
        display_name: &str,
        active: bool,
    ) -> Result<i64, DbError> {
        let id = self.conn.query_row(
            "INSERT INTO entities (display_name, report_code, active)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(report_code) DO UPDATE SET
               display_name = excluded.display_name,
               active = excluded.active
             RETURNING id",
            params![display_name, code.to_string(), active],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Entities ordered by report code, optionally only the active ones.
    pub fn list_entities(&self, only_active: bool) -> Result<Vec<Entity>, DbError> {
        let sql = if only_active {
            "SELECT id, display_name, report_code, active FROM entities
             WHERE active = 1 ORDER BY report_code ASC"
        } else {
            "SELECT id, display_name, report_code, active FROM entities
             ORDER BY report_code ASC"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let entities = stmt
            .query_map([], entity_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entities)
    }

    /// Flip an entity's active flag. Returns `false` when no entity has the code.
    pub fn set_entity_active(&self, code: ReportCode, active: bool) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE entities SET active = ?1 WHERE report_code = ?2",
            params![active, code.to_string()],
        )?;
        Ok(changed > 0)
    }

    /// Insert all rows in a single transaction.
    pub fn insert_report_rows(&self, rows: &[StoredRow]) -> Result<usize, DbError> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_ROW_SQL)?;
            for row in rows {
                execute_insert(&mut stmt, row)?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    pub fn insert_report_row(&self, row: &StoredRow) -> Result<(), DbError> {
        let mut stmt = self.conn.prepare_cached(INSERT_ROW_SQL)?;
        execute_insert(&mut stmt, row)?;
        Ok(())
    }

    /// Most recently inserted rows first.
    pub fn recent_rows(&self, limit: i64) -> Result<Vec<DbReportRow>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, entity_name, report_code, month, deadline_date, delivery_date,
                    delivery_date_raw, status, budget_unit, year, extracted_at
             FROM report_rows
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(DbReportRow {
                    id: row.get(0)?,
                    entity_name: row.get(1)?,
                    report_code: row.get(2)?,
                    month: row.get(3)?,
                    deadline_date: row.get(4)?,
                    delivery_date: row.get(5)?,
                    delivery_date_raw: row.get(6)?,
                    status: row.get(7)?,
                    budget_unit: row.get(8)?,
                    year: row.get(9)?,
                    extracted_at: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn row_count(&self) -> Result<i64, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM report_rows", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl Registry for Db {
    fn list_active(&self) -> Result<Vec<Entity>, StoreError> {
        Ok(self.list_entities(true)?)
    }
}

impl ResultStore for Db {
    fn insert_many(&self, rows: &[StoredRow]) -> Result<usize, StoreError> {
        Ok(self.insert_report_rows(rows)?)
    }

    fn insert_one(&self, row: &StoredRow) -> Result<(), StoreError> {
        Ok(self.insert_report_row(row)?)
    }
}

fn entity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entity> {
    let code: String = row.get(2)?;
    let report_code = code.parse::<ReportCode>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Entity {
        id: row.get(0)?,
        display_name: row.get(1)?,
        report_code,
        active: row.get(3)?,
    })
}

fn execute_insert(stmt: &mut rusqlite::Statement<'_>, row: &StoredRow) -> rusqlite::Result<usize> {
    stmt.execute(params![
        row.entity_id,
        row.entity_name,
        row.report_code,
        row.month,
        row.deadline_date,
        row.delivery_date,
        row.delivery_date_raw,
        row.status,
        row.budget_unit,
        row.year,
    ])
}
