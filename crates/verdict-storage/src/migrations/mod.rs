//! Schema migrations, applied in order on open.

mod v001_initial_schema;

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use verdict_core::constants::SCHEMA_VERSION;
use verdict_core::errors::{StorageError, VerdictError, VerdictResult};

use crate::to_storage_err;

type Migration = fn(&Connection) -> VerdictResult<()>;

const MIGRATIONS: [(u32, Migration); 1] = [(1, v001_initial_schema::migrate)];

/// Current schema version recorded in the database (0 for a fresh file).
pub fn current_version(conn: &Connection) -> VerdictResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?
        .flatten();
    Ok(version.unwrap_or(0))
}

/// Apply every migration newer than the recorded version.
///
/// A database written by a newer schema is refused with `SchemaMismatch`.
pub fn run_migrations(conn: &Connection) -> VerdictResult<u32> {
    let current = current_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(VerdictError::SchemaMismatch {
            expected: format!("schema v{SCHEMA_VERSION}"),
            found: format!("schema v{current}"),
        });
    }
    for (version, migrate) in MIGRATIONS {
        if version <= current {
            continue;
        }
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| to_storage_err(e.to_string()))?;
        migrate(&tx).map_err(|e| StorageError::MigrationFailed {
            version,
            reason: e.to_string(),
        })?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
            .map_err(|e| to_storage_err(e.to_string()))?;
        tx.commit().map_err(|e| StorageError::MigrationFailed {
            version,
            reason: e.to_string(),
        })?;
        info!(version, "applied migration");
    }
    Ok(SCHEMA_VERSION)
}
