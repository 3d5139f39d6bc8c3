//! Review posture: how much scrutiny recent history calls for.

use serde::{Deserialize, Serialize};

use verdict_core::constants::POSTURE_WINDOW;
use verdict_core::ReviewRecord;

/// Mean risk below which a clean history allows concise reviews.
const CONCISE_BELOW: f64 = 35.0;
/// Mean risk below which reviews stay balanced.
const BALANCED_BELOW: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// No history yet.
    Neutral,
    Concise,
    Balanced,
    Cautious,
}

impl Tone {
    /// Review depth matching the tone.
    pub fn depth(self) -> &'static str {
        match self {
            Self::Concise => "light",
            Self::Neutral | Self::Balanced => "standard",
            Self::Cautious => "deep",
        }
    }

    pub fn caution(self) -> &'static str {
        match self {
            Self::Concise => "low",
            Self::Neutral | Self::Balanced => "normal",
            Self::Cautious => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewPosture {
    pub tone: Tone,
    /// Mean risk over the considered records.
    pub mean_risk: Option<f64>,
    pub high_risk_count: usize,
    pub samples: usize,
}

impl ReviewPosture {
    /// Posture from the most recent records (any order; at most
    /// [`POSTURE_WINDOW`] are considered, taken from the front).
    pub fn from_recent(records: &[ReviewRecord], high_risk_threshold: f64) -> Self {
        let recent = &records[..records.len().min(POSTURE_WINDOW)];
        if recent.is_empty() {
            return Self {
                tone: Tone::Neutral,
                mean_risk: None,
                high_risk_count: 0,
                samples: 0,
            };
        }
        let mean = recent.iter().map(|r| r.risk).sum::<f64>() / recent.len() as f64;
        let high_risk_count = recent
            .iter()
            .filter(|r| r.risk >= high_risk_threshold)
            .count();
        let tone = if mean < CONCISE_BELOW && high_risk_count == 0 {
            Tone::Concise
        } else if mean < BALANCED_BELOW {
            Tone::Balanced
        } else {
            Tone::Cautious
        };
        Self {
            tone,
            mean_risk: Some(mean),
            high_risk_count,
            samples: recent.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use verdict_core::{RecordId, SignalVector};

    fn risks(values: &[f64]) -> Vec<ReviewRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, risk)| {
                ReviewRecord::new(
                    RecordId::new("acme/api", i as u64, Utc::now()),
                    "feature",
                    SignalVector::default(),
                    50.0,
                    *risk,
                )
            })
            .collect()
    }

    #[test]
    fn no_history_is_neutral() {
        let posture = ReviewPosture::from_recent(&[], 70.0);
        assert_eq!(posture.tone, Tone::Neutral);
        assert_eq!(posture.tone.depth(), "standard");
    }

    #[test]
    fn low_risk_history_is_concise() {
        let posture = ReviewPosture::from_recent(&risks(&[10.0, 20.0, 30.0]), 70.0);
        assert_eq!(posture.tone, Tone::Concise);
        assert_eq!(posture.tone.depth(), "light");
    }

    #[test]
    fn one_high_risk_run_blocks_concise() {
        let posture = ReviewPosture::from_recent(&risks(&[5.0, 5.0, 5.0, 5.0, 80.0]), 70.0);
        assert!(posture.mean_risk.unwrap() < 35.0);
        assert_eq!(posture.high_risk_count, 1);
        assert_eq!(posture.tone, Tone::Balanced);
    }

    #[test]
    fn high_mean_is_cautious() {
        let posture = ReviewPosture::from_recent(&risks(&[75.0, 90.0]), 70.0);
        assert_eq!(posture.tone, Tone::Cautious);
        assert_eq!(posture.tone.caution(), "high");
    }

    #[test]
    fn only_the_window_counts() {
        let mut values = vec![10.0; POSTURE_WINDOW];
        values.extend([95.0; 5]);
        let posture = ReviewPosture::from_recent(&risks(&values), 70.0);
        assert_eq!(posture.samples, POSTURE_WINDOW);
        assert_eq!(posture.tone, Tone::Concise);
    }
}
