//! Calibration summary over recent confidence scores.
//!
//! A steady history of confidence scores earns more trust than an erratic one:
//! `consistency = max(0, 1 − σ/50)` and
//! `calibrated = min(1, 0.5 + (μ − 50)/200 + 0.25 · consistency)`.

use serde::{Deserialize, Serialize};

use verdict_core::ReviewRecord;

/// Spread at which consistency reaches zero, in score points.
const CONSISTENCY_SPREAD: f64 = 50.0;
/// Calibrated confidence with no history.
const NEUTRAL_CALIBRATION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub samples: usize,
    pub mean_confidence: Option<f64>,
    /// Population standard deviation of confidence.
    pub std_confidence: Option<f64>,
    pub consistency: Option<f64>,
    /// Overall trust in the engine's confidence, [0, 1].
    pub calibrated: f64,
}

impl Calibration {
    pub fn from_records(records: &[ReviewRecord]) -> Self {
        Self::from_scores(records.iter().map(|r| r.confidence))
    }

    /// Non-finite scores are ignored.
    pub fn from_scores(scores: impl IntoIterator<Item = f64>) -> Self {
        let scores: Vec<f64> = scores.into_iter().filter(|s| s.is_finite()).collect();
        if scores.is_empty() {
            return Self {
                samples: 0,
                mean_confidence: None,
                std_confidence: None,
                consistency: None,
                calibrated: NEUTRAL_CALIBRATION,
            };
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let consistency = (1.0 - std / CONSISTENCY_SPREAD).max(0.0);
        let calibrated = (0.5 + (mean - 50.0) / 200.0 + 0.25 * consistency).clamp(0.0, 1.0);
        Self {
            samples: scores.len(),
            mean_confidence: Some(mean),
            std_confidence: Some(std),
            consistency: Some(consistency),
            calibrated,
        }
    }
}
