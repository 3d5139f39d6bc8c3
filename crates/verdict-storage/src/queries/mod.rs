//! SQL for each table, one module per concern. Every function takes a plain
//! `&Connection` so it composes inside an exclusive transaction.

pub mod maintenance;
pub mod mesh_ops;
pub mod record_crud;
pub mod record_query;
pub mod weight_state_ops;

use chrono::{DateTime, SecondsFormat, Utc};

use verdict_core::errors::{VerdictError, VerdictResult};

/// Fixed-width RFC 3339 so lexical order equals time order.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> VerdictResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| VerdictError::StoreCorruption {
            details: format!("bad timestamp {raw:?}: {e}"),
        })
}

pub(crate) fn pr_to_sql(pr_id: u64) -> VerdictResult<i64> {
    i64::try_from(pr_id).map_err(|_| VerdictError::InvalidInput {
        reason: format!("pull request id {pr_id} exceeds the storable range"),
    })
}
