//! Read paths over review records: windows, snapshots, pending rewards.

use rusqlite::{params, Connection, Row};
use tracing::warn;

use verdict_core::errors::{VerdictError, VerdictResult};
use verdict_core::{RecordId, ReviewRecord, Reward, SignalVector};

use super::{format_ts, parse_ts, pr_to_sql};
use crate::to_storage_err;

const RECORD_COLUMNS: &str =
    "repository_id, pr_id, run_at, category, signals, confidence, risk, reward";

/// Raw column values, decoded outside the rusqlite row callback so a bad row
/// can be skipped instead of failing the whole read.
struct RawRow {
    repository_id: String,
    pr_id: i64,
    run_at: String,
    category: String,
    signals: String,
    confidence: f64,
    risk: f64,
    reward: Option<f64>,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            repository_id: row.get(0)?,
            pr_id: row.get(1)?,
            run_at: row.get(2)?,
            category: row.get(3)?,
            signals: row.get(4)?,
            confidence: row.get(5)?,
            risk: row.get(6)?,
            reward: row.get(7)?,
        })
    }

    fn decode(self) -> VerdictResult<ReviewRecord> {
        let pr_id = u64::try_from(self.pr_id).map_err(|_| VerdictError::StoreCorruption {
            details: format!("negative pull request id {}", self.pr_id),
        })?;
        let run_at = parse_ts(&self.run_at)?;
        let signals: SignalVector = serde_json::from_str(&self.signals).map_err(|e| {
            VerdictError::SchemaMismatch {
                expected: "current signal schema".to_string(),
                found: format!("{}: {e}", self.signals),
            }
        })?;
        let record = ReviewRecord::new(
            RecordId::new(self.repository_id, pr_id, run_at),
            self.category,
            signals,
            self.confidence,
            self.risk,
        );
        Ok(match self.reward.and_then(Reward::new) {
            Some(reward) => record.with_reward(reward),
            None => record,
        })
    }
}

/// Records returned by one query, plus the number of rows that no longer decode.
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub records: Vec<ReviewRecord>,
    pub skipped: usize,
}

/// Run a record query, skipping rows that no longer decode.
fn collect_records(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> VerdictResult<RecordBatch> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(args, RawRow::read)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut batch = RecordBatch::default();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        match raw.decode() {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                warn!(error = %e, "skipping unreadable review record");
                batch.skipped += 1;
            }
        }
    }
    Ok(batch)
}

/// The latest `size` records of a category, newest first.
pub fn window(conn: &Connection, category: &str, size: usize) -> VerdictResult<RecordBatch> {
    let limit = i64::try_from(size).unwrap_or(i64::MAX);
    collect_records(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS} FROM review_records
             WHERE category = ?1
             ORDER BY run_at DESC, rowid DESC
             LIMIT ?2"
        ),
        params![category, limit],
    )
}

/// One record by id. An unreadable row is reported, not skipped.
pub fn get_record(conn: &Connection, id: &RecordId) -> VerdictResult<Option<ReviewRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM review_records
             WHERE repository_id = ?1 AND pr_id = ?2 AND run_at = ?3"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut rows = stmt
        .query_map(
            params![id.repository_id, pr_to_sql(id.pr_id)?, format_ts(&id.run_at)],
            RawRow::read,
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    match rows.next() {
        Some(row) => row
            .map_err(|e| to_storage_err(e.to_string()))?
            .decode()
            .map(Some),
        None => Ok(None),
    }
}

/// Every record, oldest first.
pub fn all_records(conn: &Connection) -> VerdictResult<RecordBatch> {
    collect_records(
        conn,
        &format!("SELECT {RECORD_COLUMNS} FROM review_records ORDER BY run_at ASC, rowid ASC"),
        [],
    )
}

/// Records with a reward not yet folded into the weights, oldest first.
pub fn pending_rewards(conn: &Connection) -> VerdictResult<RecordBatch> {
    collect_records(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS} FROM review_records
             WHERE reward IS NOT NULL AND reward_applied = 0
             ORDER BY run_at ASC, rowid ASC"
        ),
        [],
    )
}

/// The latest `size` records across every category, newest first.
pub fn recent(conn: &Connection, size: usize) -> VerdictResult<RecordBatch> {
    let limit = i64::try_from(size).unwrap_or(i64::MAX);
    collect_records(
        conn,
        &format!(
            "SELECT {RECORD_COLUMNS} FROM review_records
             ORDER BY run_at DESC, rowid DESC
             LIMIT ?1"
        ),
        params![limit],
    )
}

/// Distinct category labels, sorted.
pub fn categories(conn: &Connection) -> VerdictResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT category FROM review_records ORDER BY category")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.map(|r| r.map_err(|e| to_storage_err(e.to_string())))
        .collect()
}

/// Number of stored records.
pub fn count_records(conn: &Connection) -> VerdictResult<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM review_records", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count.max(0) as u64)
}
