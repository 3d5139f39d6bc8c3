//! End-to-end runs: assess, replay, reconcile, refit, posture, calibration.

use chrono::{Duration, TimeZone, Utc};

use verdict_core::config::VerdictConfig;
use verdict_core::{IReviewMemory, Outcome, RecordId, SignalKind, WeightVector};
use verdict_engine::{init_tracing, RawReview, ReconcileStatus, ReviewEngine};
use verdict_scoring::RawSignals;

fn engine() -> ReviewEngine {
    ReviewEngine::open_in_memory(VerdictConfig::default()).unwrap()
}

fn review(pr_id: u64, minute: i64, category: &str, severity: f64) -> RawReview {
    RawReview {
        repository_id: Some("acme/api".into()),
        pr_id,
        run_at: Some(Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap() + Duration::minutes(minute)),
        signals: RawSignals {
            category: Some(category.into()),
            diff_lines: Some(120),
            ai_severity: Some(severity),
            historical_risk: Some(0.3),
            ..Default::default()
        },
    }
}

#[test]
fn complete_review_is_scored_and_remembered() {
    let engine = engine();
    let summary = engine.assess(&review(1, 0, "security", 0.9));
    assert!(summary.recorded);
    assert!(!summary.is_degraded());
    assert!(summary.substituted.is_empty());
    assert_eq!(summary.category, "security");
    assert_eq!(summary.weights, WeightVector::uniform());
    assert!((0.0..=100.0).contains(&summary.confidence));
    assert!((0.0..=100.0).contains(&summary.risk));
    assert_eq!(engine.store().record_count().unwrap(), 1);

    let json = summary.to_json().unwrap();
    assert!(json.contains("\"confidence\""));
}

#[test]
fn replayed_run_is_not_duplicated() {
    let engine = engine();
    let first = engine.assess(&review(4, 0, "feature", 0.4));
    let replay = engine.assess(&review(4, 0, "feature", 0.4));
    assert!(first.recorded);
    assert!(!replay.recorded);
    assert_eq!(first.confidence, replay.confidence);
    assert_eq!(engine.store().record_count().unwrap(), 1);
}

#[test]
fn missing_signals_fall_back_to_prior_and_are_reported() {
    let engine = engine();
    let summary = engine.assess(&RawReview {
        pr_id: 2,
        ..Default::default()
    });
    assert_eq!(summary.substituted, SignalKind::ALL.to_vec());
    assert_eq!(summary.degradations.len(), 4);
    assert!(summary.degradations[0].failure.contains("missing"));
    assert_eq!(summary.record_id.repository_id, "local");
    // Neutral prior under uniform weights.
    assert!((summary.confidence - 50.0).abs() < 1e-9);
}

#[test]
fn reconcile_unknown_record_is_not_found() {
    let engine = engine();
    let id = RecordId::new("acme/api", 404, Utc::now());
    let err = engine.reconcile(&id, Outcome::Accepted).unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn reconcile_applies_once() {
    let engine = engine();
    let summary = engine.assess(&review(1, 0, "security", 0.9));

    let status = engine
        .reconcile(&summary.record_id, Outcome::Accepted)
        .unwrap();
    let ReconcileStatus::Applied { weights, clock } = status else {
        panic!("expected Applied, got {status:?}");
    };
    assert!(weights.is_normalized());
    assert_eq!(clock, 1);

    assert_eq!(
        engine.reconcile(&summary.record_id, Outcome::Accepted).unwrap(),
        ReconcileStatus::AlreadyRecorded
    );
    let err = engine
        .reconcile(&summary.record_id, Outcome::Reverted)
        .unwrap_err();
    assert_eq!(err.kind(), "outcome_conflict");
    assert_eq!(engine.weight_state().unwrap().clock, 1);
}

#[test]
fn accurate_severity_driven_run_gains_severity_weight() {
    let engine = engine();
    let summary = engine.assess(&RawReview {
        repository_id: Some("acme/api".into()),
        pr_id: 8,
        run_at: None,
        signals: RawSignals {
            category: Some("documentation".into()),
            diff_lines: Some(0),
            ai_severity: Some(0.9),
            historical_risk: Some(0.1),
            ..Default::default()
        },
    });
    let before = summary.weights.get(SignalKind::Severity);
    let status = engine
        .reconcile(
            &summary.record_id,
            Outcome::Overridden {
                score: summary.confidence,
            },
        )
        .unwrap();
    let ReconcileStatus::Applied { weights, .. } = status else {
        panic!("expected Applied, got {status:?}");
    };
    assert!(weights.get(SignalKind::Severity) > before);

    let next = engine.assess(&review(9, 1, "feature", 0.5));
    assert_eq!(next.weights, weights);
}

#[test]
fn refit_priors_fill_missing_signals_and_persist() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = VerdictConfig::default();
    config.storage.db_path = dir.path().join("verdict.db").to_string_lossy().into_owned();

    {
        let engine = ReviewEngine::open(config.clone()).unwrap();
        for i in 0..3 {
            engine.assess(&review(i, i as i64, "security", 0.9));
        }
        let model = engine.refit_trend_model().unwrap();
        assert_eq!(model.category_prior("security").unwrap().samples, 3);
    }

    let engine = ReviewEngine::open(config).unwrap();
    let summary = engine.assess(&RawReview {
        repository_id: Some("acme/api".into()),
        pr_id: 50,
        run_at: None,
        signals: RawSignals {
            category: Some("security".into()),
            diff_lines: Some(120),
            historical_risk: Some(0.3),
            ..Default::default()
        },
    });
    assert_eq!(summary.substituted, vec![SignalKind::Severity]);
    let record = engine
        .store()
        .window("security", 1)
        .unwrap()
        .remove(0);
    assert!((record.signals.get(SignalKind::Severity) - 0.9).abs() < 1e-9);
}

#[test]
fn posture_calibration_and_stats_reflect_history() {
    let engine = engine();
    assert_eq!(engine.posture().unwrap().tone, verdict_prediction::Tone::Neutral);
    assert_eq!(engine.calibration().unwrap().samples, 0);

    for i in 0..4 {
        engine.assess(&review(i, i as i64, "security", 1.0));
    }
    let posture = engine.posture().unwrap();
    assert_eq!(posture.samples, 4);
    assert_ne!(posture.tone, verdict_prediction::Tone::Neutral);

    let calibration = engine.calibration().unwrap();
    assert_eq!(calibration.samples, 4);
    assert!(calibration.consistency.unwrap() > 0.999);

    let stats = engine.category_stats("security").unwrap();
    assert_eq!(stats.count, 4);
    assert!(stats.trend.is_none());
    assert_eq!(engine.category_stats("  Security ").unwrap(), stats);
}

#[test]
fn missing_history_comes_from_stored_category_runs() {
    let engine = engine();
    let unrated = |pr_id: u64, category: &str| RawReview {
        repository_id: Some("acme/api".into()),
        pr_id,
        run_at: Some(Utc.with_ymd_and_hms(2026, 4, 2, 8, 0, 0).unwrap() + Duration::minutes(pr_id as i64)),
        signals: RawSignals {
            category: Some(category.into()),
            diff_lines: Some(5_000),
            ai_severity: Some(1.0),
            ..Default::default()
        },
    };

    let first = engine.assess(&unrated(1, "security"));
    assert_eq!(first.substituted, vec![SignalKind::History]);

    let second = engine.assess(&unrated(2, "Security"));
    assert!(second.substituted.is_empty());
    let latest = engine.store().window("security", 1).unwrap().remove(0);
    assert_eq!(latest.id.pr_id, 2);
    assert!((latest.signals.get(SignalKind::History) - first.risk / 100.0).abs() < 1e-9);

    // Another category's history does not leak in.
    let other = engine.assess(&unrated(3, "documentation"));
    assert_eq!(other.substituted, vec![SignalKind::History]);
}

#[test]
fn tracing_init_is_idempotent() {
    let config = VerdictConfig::default();
    let first = init_tracing(&config.observability);
    let second = init_tracing(&config.observability);
    assert_eq!(first, second);
}
