//! Adaptive Weight Tuner.
//!
//! Each weight moves toward the record's signal profile (`tᵢ = sᵢ / Σs`) when
//! the reward is high and away from it when the reward is low:
//!
//! ```text
//! wᵢ' = wᵢ + α · (2r − 1) · (tᵢ − wᵢ)
//! ```
//!
//! then every weight is clipped at zero and the vector renormalized. The
//! learning rate α is capped, so one noisy outcome moves any weight by at
//! most α.

use tracing::{debug, info};

use verdict_core::config::LearningConfig;
use verdict_core::constants::{MAX_LEARNING_RATE, SIGNAL_COUNT};
use verdict_core::errors::{VerdictError, VerdictResult};
use verdict_core::{ReviewRecord, Reward, SignalVector, WeightVector};

/// Bounded exponential weight tuner.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveTuner {
    learning_rate: f64,
}

impl AdaptiveTuner {
    /// Fails with `InvalidInput` unless `learning_rate` lies in (0, 0.3].
    pub fn new(learning_rate: f64) -> VerdictResult<Self> {
        if !(learning_rate > 0.0 && learning_rate <= MAX_LEARNING_RATE) {
            return Err(VerdictError::InvalidInput {
                reason: format!(
                    "learning rate must lie in (0, {MAX_LEARNING_RATE}], got {learning_rate}"
                ),
            });
        }
        Ok(Self { learning_rate })
    }

    pub fn from_config(config: &LearningConfig) -> VerdictResult<Self> {
        Self::new(config.learning_rate)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// `update(weights, record, reward) -> weights'`.
    ///
    /// Without a reward the weights come back unchanged.
    pub fn update(
        &self,
        weights: &WeightVector,
        record: &ReviewRecord,
        reward: Option<Reward>,
    ) -> WeightVector {
        match reward {
            Some(reward) => {
                let next = self.nudge(weights, &record.signals, reward);
                info!(
                    id = %record.id,
                    reward = reward.value(),
                    before = ?weights.values(),
                    after = ?next.values(),
                    "weights updated"
                );
                next
            }
            None => {
                debug!(id = %record.id, "no reward yet; weights unchanged");
                *weights
            }
        }
    }

    /// Apply one reward-scaled step toward (or away from) a signal profile.
    pub fn nudge(&self, weights: &WeightVector, signals: &SignalVector, reward: Reward) -> WeightVector {
        let total = signals.sum();
        if total <= 0.0 {
            return *weights;
        }
        let step = self.learning_rate * (2.0 * reward.value() - 1.0);
        let mut next = [0.0; SIGNAL_COUNT];
        for (slot, (kind, weight)) in next.iter_mut().zip(weights.iter()) {
            let target = signals.get(kind) / total;
            *slot = (weight + step * (target - weight)).max(0.0);
        }
        WeightVector::normalized(next)
    }
}

impl Default for AdaptiveTuner {
    fn default() -> Self {
        Self {
            learning_rate: LearningConfig::default().learning_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use verdict_core::{RecordId, SignalKind};

    fn record(signals: [f64; 4]) -> ReviewRecord {
        ReviewRecord::new(
            RecordId::new("acme/api", 9, Utc::now()),
            "security",
            SignalVector::new(signals),
            62.0,
            70.0,
        )
    }

    fn spec_weights() -> WeightVector {
        WeightVector::from_raw([0.4, 0.3, 0.2, 0.1]).unwrap()
    }

    #[test]
    fn perfect_reward_raises_dominant_signal_share() {
        let tuner = AdaptiveTuner::default();
        let r = record([0.3, 0.2, 0.9, 0.1]);
        assert_eq!(r.signals.dominant(), SignalKind::Severity);
        let next = tuner.update(&spec_weights(), &r, Reward::new(1.0));
        assert!(next.get(SignalKind::Severity) > spec_weights().get(SignalKind::Severity));
        assert!(next.is_normalized());
    }

    #[test]
    fn zero_reward_moves_away_from_profile() {
        let tuner = AdaptiveTuner::default();
        let r = record([0.3, 0.2, 0.9, 0.1]);
        let next = tuner.update(&spec_weights(), &r, Reward::new(0.0));
        assert!(next.get(SignalKind::Severity) < spec_weights().get(SignalKind::Severity));
        assert!(next.is_normalized());
    }

    #[test]
    fn missing_reward_is_a_no_op() {
        let tuner = AdaptiveTuner::default();
        let r = record([0.3, 0.2, 0.9, 0.1]);
        assert_eq!(tuner.update(&spec_weights(), &r, None), spec_weights());
    }

    #[test]
    fn neutral_reward_and_silent_record_change_nothing() {
        let tuner = AdaptiveTuner::default();
        let half = tuner.update(&spec_weights(), &record([0.3, 0.2, 0.9, 0.1]), Reward::new(0.5));
        for (a, b) in half.values().iter().zip(spec_weights().values()) {
            assert!((a - b).abs() < 1e-12);
        }
        let silent = tuner.update(&spec_weights(), &record([0.0; 4]), Reward::new(1.0));
        assert_eq!(silent, spec_weights());
    }

    #[test]
    fn learning_rate_is_bounded() {
        assert!(AdaptiveTuner::new(0.0).is_err());
        assert!(AdaptiveTuner::new(0.31).is_err());
        assert!(AdaptiveTuner::new(f64::NAN).is_err());
        assert!(AdaptiveTuner::new(0.3).is_ok());
    }

    #[test]
    fn one_step_moves_each_weight_by_at_most_alpha() {
        let tuner = AdaptiveTuner::new(0.3).unwrap();
        let next = tuner.update(&spec_weights(), &record([0.0, 0.0, 1.0, 0.0]), Reward::new(1.0));
        for (a, b) in next.values().iter().zip(spec_weights().values()) {
            assert!((a - b).abs() <= 0.3 + 1e-12);
        }
    }
}
