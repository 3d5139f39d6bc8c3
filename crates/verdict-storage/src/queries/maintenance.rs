//! Integrity check.

use rusqlite::Connection;

use verdict_core::errors::VerdictResult;

use crate::to_storage_err;

/// `PRAGMA integrity_check`. Returns true if the database is healthy.
pub fn integrity_check(conn: &Connection) -> VerdictResult<bool> {
    run_integrity_check(conn).map_err(|e| to_storage_err(e.to_string()))
}

/// Same check, keeping the SQLite error code for corruption detection.
pub(crate) fn run_integrity_check(conn: &Connection) -> rusqlite::Result<bool> {
    let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    Ok(result == "ok")
}
