//! Property tests: every tuned vector stays a valid weight vector.

use chrono::Utc;
use proptest::prelude::*;

use verdict_core::{RecordId, ReviewRecord, Reward, SignalVector, WeightVector};
use verdict_learning::AdaptiveTuner;

fn record(signals: [f64; 4]) -> ReviewRecord {
    ReviewRecord::new(
        RecordId::new("acme/api", 1, Utc::now()),
        "feature",
        SignalVector::new(signals),
        50.0,
        50.0,
    )
}

proptest! {
    #[test]
    fn prop_update_preserves_weight_invariant(
        raw_weights in prop::array::uniform4(0.0..10.0f64),
        signals in prop::array::uniform4(0.0..=1.0f64),
        reward in 0.0..=1.0f64,
        rate in 0.001..=0.3f64,
    ) {
        let tuner = AdaptiveTuner::new(rate).unwrap();
        let weights = WeightVector::normalized(raw_weights);
        let next = tuner.update(&weights, &record(signals), Reward::new(reward));
        prop_assert!(next.is_normalized());
        for (_, w) in next.iter() {
            prop_assert!(w >= 0.0);
        }
    }

    #[test]
    fn prop_repeated_updates_stay_valid(
        steps in prop::collection::vec((prop::array::uniform4(0.0..=1.0f64), 0.0..=1.0f64), 1..50),
    ) {
        let tuner = AdaptiveTuner::new(0.3).unwrap();
        let mut weights = WeightVector::uniform();
        for (signals, reward) in steps {
            weights = tuner.update(&weights, &record(signals), Reward::new(reward));
            prop_assert!(weights.is_normalized());
        }
    }

    #[test]
    fn prop_missing_reward_never_changes_weights(
        raw_weights in prop::array::uniform4(0.01..10.0f64),
        signals in prop::array::uniform4(0.0..=1.0f64),
    ) {
        let weights = WeightVector::normalized(raw_weights);
        prop_assert_eq!(AdaptiveTuner::default().update(&weights, &record(signals), None), weights);
    }
}
