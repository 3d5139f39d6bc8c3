//! Detect an unreadable store before the pool attaches to it.

use std::path::Path;

use rusqlite::{Connection, ErrorCode, OpenFlags};

use verdict_core::errors::VerdictResult;

use crate::queries::maintenance;
use crate::to_storage_err;

/// Whether the file at `path` is a readable, consistent SQLite database.
/// A missing file is healthy: it will be created fresh.
pub fn check_integrity(path: &Path) -> VerdictResult<bool> {
    if !path.exists() {
        return Ok(true);
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
        .map_err(|e| to_storage_err(e.to_string()))?;
    match maintenance::run_integrity_check(&conn) {
        Ok(healthy) => Ok(healthy),
        Err(e) if is_corruption(&e) => Ok(false),
        Err(e) => Err(to_storage_err(e.to_string())),
    }
}

fn is_corruption(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::NotADatabase) | Some(ErrorCode::DatabaseCorrupt)
    )
}
