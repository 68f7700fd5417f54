//! CLI subcommand implementations.

pub mod entities;
pub mod extract;
pub mod fetch;
pub mod recent;
pub mod status;

use std::path::Path;

use anyhow::Result;
use tceprest_lib::Db;

/// Open the database and make sure the schema is in place.
pub(crate) fn open_db(path: &Path) -> Result<Db> {
    let db = Db::open(path)?;
    db.init()?;
    Ok(db)
}
