//! The single-row persisted tuning state.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use verdict_core::errors::{VerdictError, VerdictResult};
use verdict_core::{PriorSnapshot, WeightState, WeightVector};

use super::{format_ts, parse_ts};
use crate::to_storage_err;

/// Load the weight state. A store that has never been tuned yields the
/// uniform default; weights that disagree with the signal schema yield
/// `SchemaMismatch`.
pub fn load_weight_state(conn: &Connection) -> VerdictResult<WeightState> {
    let row: Option<(String, i64, String, Option<String>)> = conn
        .query_row(
            "SELECT weights, clock, priors, updated_at FROM weight_state WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let Some((weights, clock, priors, updated_at)) = row else {
        return Ok(WeightState::default());
    };
    let weights: WeightVector =
        serde_json::from_str(&weights).map_err(|e| VerdictError::SchemaMismatch {
            expected: "current weight schema".to_string(),
            found: format!("{weights}: {e}"),
        })?;
    let priors: PriorSnapshot = serde_json::from_str(&priors).map_err(|e| {
        VerdictError::SchemaMismatch {
            expected: "current prior schema".to_string(),
            found: e.to_string(),
        }
    })?;
    Ok(WeightState {
        weights,
        clock: clock.max(0) as u64,
        priors,
        updated_at: updated_at.as_deref().map(parse_ts).transpose()?,
    })
}

/// The logical clock alone, readable even when the vectors are not.
pub fn load_clock(conn: &Connection) -> VerdictResult<u64> {
    let clock: Option<i64> = conn
        .query_row("SELECT clock FROM weight_state WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(clock.unwrap_or(0).max(0) as u64)
}

/// Overwrite the weight state row.
pub fn save_weight_state(conn: &Connection, state: &WeightState) -> VerdictResult<()> {
    let weights = serde_json::to_string(&state.weights)?;
    let priors = serde_json::to_string(&state.priors)?;
    let clock = i64::try_from(state.clock).unwrap_or(i64::MAX);
    conn.execute(
        "INSERT INTO weight_state (id, weights, clock, priors, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            weights = excluded.weights,
            clock = excluded.clock,
            priors = excluded.priors,
            updated_at = excluded.updated_at",
        params![
            weights,
            clock,
            priors,
            state.updated_at.as_ref().map(format_ts)
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Replace unreadable state with uniform weights and empty priors, keeping
/// the clock moving forward.
pub fn reset_weight_state(conn: &Connection) -> VerdictResult<WeightState> {
    let state = WeightState {
        clock: load_clock(conn)?.saturating_add(1),
        updated_at: Some(Utc::now()),
        ..WeightState::default()
    };
    save_weight_state(conn, &state)?;
    Ok(state)
}
