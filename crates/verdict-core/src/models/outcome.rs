use serde::{Deserialize, Serialize};

use crate::constants::SCORE_SCALE;

/// Ground truth about a reviewed pull request, known some time after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Merged with the assessment unchallenged.
    Accepted,
    /// A human reviewer replaced the engine's score with their own (0..=100).
    Overridden { score: f64 },
    /// Reverted after merge.
    Reverted,
}

impl Outcome {
    /// The confidence the engine should have reported, in [0, 100].
    pub fn observed_score(&self) -> f64 {
        match self {
            Self::Accepted => SCORE_SCALE,
            Self::Overridden { score } if score.is_nan() => 0.0,
            Self::Overridden { score } => score.clamp(0.0, SCORE_SCALE),
            Self::Reverted => 0.0,
        }
    }
}

/// Accuracy feedback for one past score, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reward(f64);

impl Reward {
    /// Clamp into [0, 1]. NaN carries no information and yields `None`.
    pub fn new(value: f64) -> Option<Self> {
        if value.is_nan() {
            None
        } else {
            Some(Self(value.clamp(0.0, 1.0)))
        }
    }

    /// `1 − |predicted − observed| / 100` for a confidence in [0, 100].
    pub fn from_outcome(predicted_confidence: f64, outcome: &Outcome) -> Self {
        let predicted = if predicted_confidence.is_nan() {
            0.0
        } else {
            predicted_confidence.clamp(0.0, SCORE_SCALE)
        };
        let error = (predicted - outcome.observed_score()).abs() / SCORE_SCALE;
        Self((1.0 - error).clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}
