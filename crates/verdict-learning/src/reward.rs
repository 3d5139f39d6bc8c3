//! Outcome → reward.

use tracing::debug;

use verdict_core::{Outcome, ReviewRecord, Reward};

/// Reward for a scored record once its outcome is known:
/// `1 − |confidence − observed| / 100`, where an accepted change observes
/// 100, a reverted one 0, and a human override its own score.
pub fn derive_reward(record: &ReviewRecord, outcome: &Outcome) -> Reward {
    let reward = Reward::from_outcome(record.confidence, outcome);
    debug!(
        id = %record.id,
        confidence = record.confidence,
        observed = outcome.observed_score(),
        reward = reward.value(),
        "reward derived"
    );
    reward
}
