//! The single-row merged mesh snapshot, stored as JSON with its digest.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use verdict_core::errors::{VerdictError, VerdictResult};

use super::format_ts;
use crate::to_storage_err;

/// Load the stored snapshot and its digest, if any.
pub fn load_mesh_state<T: DeserializeOwned>(conn: &Connection) -> VerdictResult<Option<(T, String)>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT state, digest FROM mesh_state WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.map(|(state, digest)| {
        serde_json::from_str(&state)
            .map(|state| (state, digest))
            .map_err(|e| VerdictError::SchemaMismatch {
                expected: "current mesh schema".to_string(),
                found: e.to_string(),
            })
    })
    .transpose()
}

/// Overwrite the stored snapshot.
pub fn save_mesh_state<T: Serialize>(conn: &Connection, state: &T, digest: &str) -> VerdictResult<()> {
    let json = serde_json::to_string(state)?;
    conn.execute(
        "INSERT INTO mesh_state (id, state, digest, updated_at)
         VALUES (1, ?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
            state = excluded.state,
            digest = excluded.digest,
            updated_at = excluded.updated_at",
        params![json, digest, format_ts(&Utc::now())],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
