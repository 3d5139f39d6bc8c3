//! Refit behaviour: cold start, idempotence, and bounded movement of
//! established priors.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use verdict_core::config::PredictionConfig;
use verdict_core::{IPriorSource, RecordId, ReviewRecord, SignalKind, SignalVector};
use verdict_prediction::TrendModel;

fn records(category: &str, count: usize, signals: [f64; 4], offset: usize) -> Vec<ReviewRecord> {
    let base = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            ReviewRecord::new(
                RecordId::new("acme/api", (offset + i) as u64, base + Duration::minutes((offset + i) as i64)),
                category,
                SignalVector::new(signals),
                50.0,
                50.0,
            )
        })
        .collect()
}

#[test]
fn cold_start_prior_is_global_mean() {
    let mut history = records("security", 3, [0.9, 0.9, 0.9, 0.9], 0);
    history.extend(records("docs", 1, [0.1, 0.3, 0.5, 0.7], 3));
    let model = TrendModel::fit(&history, &PredictionConfig::default());
    let prior: &dyn IPriorSource = &model;
    let cold = prior.prior("infrastructure");
    assert_eq!(cold, model.global_mean());
    assert!((cold.get(SignalKind::Diff) - 0.5).abs() < 1e-12);
    assert!((cold.get(SignalKind::History) - 0.8).abs() < 1e-12);
}

#[test]
fn refit_on_same_history_is_idempotent() {
    let config = PredictionConfig::default();
    let history = records("feature", 30, [0.4, 0.5, 0.6, 0.7], 0);
    let previous = TrendModel::fit(&records("feature", 25, [0.1, 0.1, 0.1, 0.1], 100), &config);

    let once = previous.refit(&history);
    let twice = once.refit(&history);
    assert_eq!(once.prior("feature"), twice.prior("feature"));
    assert_eq!(once.to_snapshot().categories, twice.to_snapshot().categories);
}

#[test]
fn established_prior_moves_a_bounded_step() {
    let config = PredictionConfig::default();
    let established = TrendModel::fit(&records("security", 40, [0.2, 0.2, 0.2, 0.2], 0), &config);

    let mut history = records("security", 40, [0.2, 0.2, 0.2, 0.2], 0);
    history.extend(records("security", 200, [1.0, 1.0, 1.0, 1.0], 40));
    let refitted = established.refit(&history);

    let before = established.prior("security");
    let after = refitted.prior("security");
    for kind in SignalKind::ALL {
        let moved = after.get(kind) - before.get(kind);
        assert!(moved > 0.0);
        assert!(moved <= config.max_prior_shift + 1e-12);
    }
}

#[test]
fn sparse_prior_adopts_fresh_mean() {
    let config = PredictionConfig::default();
    let sparse = TrendModel::fit(&records("style", 2, [0.0, 0.0, 0.0, 0.0], 0), &config);
    let mut history = records("style", 2, [0.0, 0.0, 0.0, 0.0], 0);
    history.extend(records("style", 2, [1.0, 1.0, 1.0, 1.0], 2));
    let refitted = sparse.refit(&history);
    assert_eq!(refitted.prior("style"), SignalVector::splat(0.5));
}

#[test]
fn categories_absent_from_new_history_are_kept() {
    let config = PredictionConfig::default();
    let model = TrendModel::fit(&records("legacy", 3, [0.3, 0.3, 0.3, 0.3], 0), &config);
    let refitted = model.refit(&records("feature", 3, [0.6, 0.6, 0.6, 0.6], 10));
    assert_eq!(refitted.prior("legacy"), model.prior("legacy"));
    assert!(refitted.category_prior("feature").is_some());
}

proptest! {
    #[test]
    fn prop_refit_moves_established_priors_boundedly(
        old in prop::array::uniform4(0.0..=1.0f64),
        new in prop::array::uniform4(0.0..=1.0f64),
        extra in 1usize..100,
    ) {
        let config = PredictionConfig::default();
        let base = records("security", config.abundant_samples, old, 0);
        let model = TrendModel::fit(&base, &config);
        let mut history = base.clone();
        history.extend(records("security", extra, new, base.len()));
        let refitted = model.refit(&history);
        for kind in SignalKind::ALL {
            let moved = (refitted.prior("security").get(kind) - model.prior("security").get(kind)).abs();
            prop_assert!(moved <= config.max_prior_shift + 1e-9);
        }
    }
}
