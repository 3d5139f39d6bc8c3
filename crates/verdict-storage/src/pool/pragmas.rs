//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL mode, NORMAL sync, foreign_keys ON. WAL gives readers a stable
//! snapshot while a writer commits.

use rusqlite::Connection;

use verdict_core::errors::VerdictResult;

use crate::to_storage_err;

/// Apply pragmas to the writer connection.
pub fn apply_pragmas(conn: &Connection) -> VerdictResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Apply pragmas to a read-only connection.
pub fn apply_read_pragmas(conn: &Connection) -> VerdictResult<()> {
    conn.execute_batch("PRAGMA query_only = ON;")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
