//! Recoverable failures degrade a run instead of failing it.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use rusqlite::Connection;

use verdict_core::config::VerdictConfig;
use verdict_core::{IReviewMemory, Outcome, Reward, WeightVector};
use verdict_engine::{RawReview, ReconcileStatus, ReviewEngine};
use verdict_scoring::RawSignals;

fn config(path: &Path, lock_timeout_ms: u64) -> VerdictConfig {
    let mut config = VerdictConfig::default();
    config.storage.db_path = path.to_string_lossy().into_owned();
    config.storage.lock_timeout_ms = lock_timeout_ms;
    config
}

fn review(pr_id: u64) -> RawReview {
    RawReview {
        repository_id: Some("acme/web".into()),
        pr_id,
        run_at: None,
        signals: RawSignals {
            category: Some("bug fix".into()),
            diff_lines: Some(40),
            ai_severity: Some(0.6),
            historical_risk: Some(0.5),
            ..Default::default()
        },
    }
}

fn hold_write_lock(path: &Path) -> Connection {
    let other = Connection::open(path).unwrap();
    other.execute_batch("BEGIN IMMEDIATE").unwrap();
    other
}

// ═══════════════════════════════════════════════════════════════════════════
// Lock contention
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn held_lock_still_yields_a_score_with_last_known_weights() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verdict.db");
    let engine = ReviewEngine::open(config(&path, 150)).unwrap();

    let first = engine.assess(&review(1));
    engine
        .store()
        .record_outcome(&first.record_id, Reward::new(0.95).unwrap())
        .unwrap();

    let other = hold_write_lock(&path);
    let blocked = engine.assess(&review(2));
    assert!(!blocked.recorded);
    assert_eq!(blocked.weights, WeightVector::uniform());
    assert!((0.0..=100.0).contains(&blocked.confidence));
    let components: Vec<&str> = blocked
        .degradations
        .iter()
        .map(|d| d.component.as_str())
        .collect();
    assert!(components.contains(&"weights"));
    assert!(components.contains(&"review_memory"));
    assert_eq!(engine.store().pending_count().unwrap(), 1);
    other.execute_batch("ROLLBACK").unwrap();

    // The deferred reward lands on the next run.
    let next = engine.assess(&review(3));
    assert!(next.recorded);
    assert!(!next.is_degraded());
    assert_ne!(next.weights, WeightVector::uniform());
    assert_eq!(engine.store().pending_count().unwrap(), 0);
    assert_eq!(engine.weight_state().unwrap().clock, 1);
}

#[test]
fn reconcile_under_held_lock_reports_timeout_then_applies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verdict.db");
    let engine = ReviewEngine::open(config(&path, 150)).unwrap();
    let summary = engine.assess(&review(1));

    let other = hold_write_lock(&path);
    let err = engine
        .reconcile(&summary.record_id, Outcome::Accepted)
        .unwrap_err();
    assert_eq!(err.kind(), "lock_timeout");
    other.execute_batch("ROLLBACK").unwrap();

    let status = engine
        .reconcile(&summary.record_id, Outcome::Accepted)
        .unwrap();
    assert!(matches!(status, ReconcileStatus::Applied { clock: 1, .. }));
}

#[test]
fn concurrent_assessments_are_all_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verdict.db");
    let engine = Arc::new(ReviewEngine::open(config(&path, 5_000)).unwrap());

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                (0..5u64)
                    .map(|i| engine.assess(&review(t * 100 + i)).recorded)
                    .filter(|recorded| *recorded)
                    .count()
            })
        })
        .collect();
    let recorded: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(recorded, 20);
    assert_eq!(engine.store().record_count().unwrap(), 20);
}

// ═══════════════════════════════════════════════════════════════════════════
// Corruption and stale state
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn corrupt_store_is_reported_once_and_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verdict.db");
    std::fs::write(&path, b"definitely not a sqlite database, just noise").unwrap();

    let engine = ReviewEngine::open(config(&path, 500)).unwrap();
    assert!(engine.store().recovered_corruption().is_some());

    let first = engine.assess(&review(1));
    assert!(first.recorded);
    assert!(first
        .degradations
        .iter()
        .any(|d| d.component == "review_memory" && d.failure.contains("unreadable")));

    let second = engine.assess(&review(2));
    assert!(!second.is_degraded());
    assert_eq!(engine.store().snapshot().unwrap().len(), 2);
}

#[test]
fn stale_weight_schema_falls_back_to_uniform() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verdict.db");
    {
        let engine = ReviewEngine::open(config(&path, 500)).unwrap();
        engine
            .store()
            .set_weights(WeightVector::from_raw([0.4, 0.3, 0.2, 0.1]).unwrap())
            .unwrap();
    }
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "UPDATE weight_state SET weights = '{\"lines\": 0.5, \"vibes\": 0.5}' WHERE id = 1",
            [],
        )
        .unwrap();
    }

    let engine = ReviewEngine::open(config(&path, 500)).unwrap();
    let summary = engine.assess(&review(1));
    assert!(summary.recorded);
    assert_eq!(summary.weights, WeightVector::uniform());
    assert!(summary
        .degradations
        .iter()
        .any(|d| d.component == "weights" && d.failure.contains("schema mismatch")));
    assert_eq!(engine.weight_state().unwrap().weights, WeightVector::uniform());
}

#[test]
fn unreadable_rows_flag_the_run_that_skipped_them() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("verdict.db");
    let engine = ReviewEngine::open(config(&path, 500)).unwrap();
    assert!(engine.assess(&review(1)).recorded);
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "UPDATE review_records SET signals = '{\"vibes\": 1.0}' WHERE pr_id = 1",
            [],
        )
        .unwrap();
    }

    let mut without_history = review(2);
    without_history.signals.historical_risk = None;
    let summary = engine.assess(&without_history);
    assert!(summary.recorded);
    assert!(summary
        .degradations
        .iter()
        .any(|d| d.component == "review_memory" && d.failure.contains("1 unreadable")));

    // A run that reads no stored records is clean.
    assert!(!engine.assess(&review(3)).is_degraded());

    // A refit has no summary of its own; the next run reports its skips.
    engine.refit_trend_model().unwrap();
    let after_refit = engine.assess(&review(4));
    assert!(after_refit
        .degradations
        .iter()
        .any(|d| d.component == "review_memory" && d.failure.contains("unreadable")));
}
