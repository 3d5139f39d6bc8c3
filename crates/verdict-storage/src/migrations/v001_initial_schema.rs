//! v001: review_records, weight_state, mesh_state.

use rusqlite::Connection;

use verdict_core::errors::VerdictResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> VerdictResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS review_records (
            repository_id  TEXT NOT NULL,
            pr_id          INTEGER NOT NULL,
            run_at         TEXT NOT NULL,
            category       TEXT NOT NULL,
            signals        TEXT NOT NULL,
            confidence     REAL NOT NULL,
            risk           REAL NOT NULL,
            reward         REAL,
            reward_applied INTEGER NOT NULL DEFAULT 0,
            recorded_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (repository_id, pr_id, run_at)
        );

        CREATE INDEX IF NOT EXISTS idx_records_category ON review_records(category, run_at);
        CREATE INDEX IF NOT EXISTS idx_records_pending
            ON review_records(reward_applied, run_at) WHERE reward IS NOT NULL;

        CREATE TABLE IF NOT EXISTS weight_state (
            id          INTEGER PRIMARY KEY CHECK (id = 1),
            weights     TEXT NOT NULL,
            clock       INTEGER NOT NULL DEFAULT 0,
            priors      TEXT NOT NULL DEFAULT '{}',
            updated_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS mesh_state (
            id          INTEGER PRIMARY KEY CHECK (id = 1),
            state       TEXT NOT NULL,
            digest      TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
