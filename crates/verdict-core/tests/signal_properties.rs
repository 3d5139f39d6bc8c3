//! Property tests for the signal schema and weight invariant.

use proptest::prelude::*;

use verdict_core::{SignalKind, SignalVector, WeightVector};

fn raw_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1e6..1e6f64,
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        Just(f64::NAN),
    ]
}

proptest! {
    #[test]
    fn prop_signal_vector_entries_are_bounded(values in prop::array::uniform4(raw_value())) {
        let v = SignalVector::new(values);
        for (_, score) in v.iter() {
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn prop_normalized_weights_sum_to_one(values in prop::array::uniform4(raw_value())) {
        let w = WeightVector::normalized(values);
        prop_assert!(w.is_normalized());
        for kind in SignalKind::ALL {
            prop_assert!(w.get(kind) >= 0.0);
        }
    }

    #[test]
    fn prop_weight_map_roundtrip(values in prop::array::uniform4(0.001..10.0f64)) {
        let w = WeightVector::from_raw(values).unwrap();
        let back = WeightVector::from_map(&w.to_map()).unwrap();
        for kind in SignalKind::ALL {
            prop_assert!((back.get(kind) - w.get(kind)).abs() < 1e-12);
        }
    }
}
