//! Append and outcome writes for review records.

use rusqlite::{params, Connection, OptionalExtension};

use verdict_core::errors::{VerdictError, VerdictResult};
use verdict_core::{RecordId, ReviewRecord, Reward};

use super::{format_ts, pr_to_sql};
use crate::to_storage_err;

/// Rewards closer than this are the same outcome replayed.
const REWARD_EPSILON: f64 = 1e-9;

/// Insert a record. Returns `false` if the id already exists.
pub fn append_record(conn: &Connection, record: &ReviewRecord) -> VerdictResult<bool> {
    let signals = serde_json::to_string(&record.signals)?;
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO review_records (
                repository_id, pr_id, run_at, category, signals, confidence, risk,
                reward, reward_applied
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0)",
            params![
                record.id.repository_id,
                pr_to_sql(record.id.pr_id)?,
                format_ts(&record.id.run_at),
                record.category,
                signals,
                record.confidence,
                record.risk,
                record.reward.map(Reward::value),
            ],
        )
        .map_err(|e| to_storage_err(format!("append {}: {e}", record.id)))?;
    Ok(inserted == 1)
}

/// Attach a reward to an existing record, leaving it pending for the tuner.
///
/// Returns `true` when the reward was newly recorded, `false` when the same
/// reward was already present.
pub fn record_outcome(conn: &Connection, id: &RecordId, reward: Reward) -> VerdictResult<bool> {
    let pr_id = pr_to_sql(id.pr_id)?;
    let run_at = format_ts(&id.run_at);
    let existing: Option<Option<f64>> = conn
        .query_row(
            "SELECT reward FROM review_records
             WHERE repository_id = ?1 AND pr_id = ?2 AND run_at = ?3",
            params![id.repository_id, pr_id, run_at],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match existing {
        None => Err(VerdictError::NotFound { id: id.to_string() }),
        Some(Some(recorded)) if (recorded - reward.value()).abs() < REWARD_EPSILON => Ok(false),
        Some(Some(recorded)) => Err(VerdictError::OutcomeConflict {
            id: id.to_string(),
            recorded,
            attempted: reward.value(),
        }),
        Some(None) => {
            conn.execute(
                "UPDATE review_records SET reward = ?4, reward_applied = 0
                 WHERE repository_id = ?1 AND pr_id = ?2 AND run_at = ?3",
                params![id.repository_id, pr_id, run_at, reward.value()],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            Ok(true)
        }
    }
}

/// Flag a record's reward as folded into the weights.
pub fn mark_reward_applied(conn: &Connection, id: &RecordId) -> VerdictResult<()> {
    conn.execute(
        "UPDATE review_records SET reward_applied = 1
         WHERE repository_id = ?1 AND pr_id = ?2 AND run_at = ?3",
        params![
            id.repository_id,
            pr_to_sql(id.pr_id)?,
            format_ts(&id.run_at)
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
