//! Weighted Confidence Scorer.
//!
//! Confidence is the tuned weighted sum of the signals; risk uses a fixed
//! secondary profile that leans on category risk and AI severity. Both are
//! pure functions of (vector, weights).

use serde::{Deserialize, Serialize};

use verdict_core::config::ScoringConfig;
use verdict_core::constants::SCORE_SCALE;
use verdict_core::signal::clamp_unit;
use verdict_core::{SignalVector, WeightVector};

/// Output of one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Self-reported certainty, [0, 100].
    pub confidence: f64,
    /// How dangerous the change is, [0, 100].
    pub risk: f64,
    pub high_risk: bool,
}

/// Stateless scorer holding the fixed risk profile.
#[derive(Debug, Clone)]
pub struct Scorer {
    risk_profile: WeightVector,
    high_risk_threshold: f64,
}

impl Scorer {
    pub fn new(risk_profile: WeightVector, high_risk_threshold: f64) -> Self {
        Self {
            risk_profile,
            high_risk_threshold,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.risk_profile, config.high_risk_threshold)
    }

    /// Score a vector under the tuned `weights`.
    pub fn score(&self, vector: &SignalVector, weights: &WeightVector) -> Assessment {
        let confidence = weighted(vector, weights);
        let risk = weighted(vector, &self.risk_profile);
        Assessment {
            confidence,
            risk,
            high_risk: risk >= self.high_risk_threshold,
        }
    }

    pub fn risk_profile(&self) -> &WeightVector {
        &self.risk_profile
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

/// `Σ wᵢ·sᵢ` scaled to [0, 100]. Entries are clamped before combination.
pub fn weighted(vector: &SignalVector, weights: &WeightVector) -> f64 {
    let sum: f64 = vector
        .iter()
        .map(|(kind, score)| clamp_unit(weights.get(kind)) * clamp_unit(score))
        .sum();
    // Renormalized weights can sum to 1 + ε.
    (sum * SCORE_SCALE).min(SCORE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::SignalKind;

    #[test]
    fn confidence_matches_worked_example() {
        let weights = WeightVector::from_raw([0.4, 0.3, 0.2, 0.1]).unwrap();
        let vector = SignalVector::new([0.8, 0.5, 0.9, 0.2]);
        let assessment = Scorer::default().score(&vector, &weights);
        assert!((assessment.confidence - 62.0).abs() < 1e-9);
    }

    #[test]
    fn risk_ignores_tuned_weights() {
        let vector = SignalVector::new([0.8, 0.5, 0.9, 0.2]);
        let scorer = Scorer::default();
        let a = scorer.score(&vector, &WeightVector::uniform());
        let b = scorer.score(&vector, &WeightVector::from_raw([1.0, 0.0, 0.0, 0.0]).unwrap());
        assert_eq!(a.risk, b.risk);
        assert_ne!(a.confidence, b.confidence);
    }

    #[test]
    fn risk_emphasizes_category_and_severity() {
        let scorer = Scorer::default();
        let weights = WeightVector::uniform();
        let mut dangerous = SignalVector::splat(0.0);
        dangerous.set(SignalKind::Category, 1.0);
        dangerous.set(SignalKind::Severity, 1.0);
        let mut large = SignalVector::splat(0.0);
        large.set(SignalKind::Diff, 1.0);
        large.set(SignalKind::History, 1.0);
        let dangerous = scorer.score(&dangerous, &weights);
        let large = scorer.score(&large, &weights);
        assert!((dangerous.risk - 70.0).abs() < 1e-9);
        assert!(dangerous.risk > large.risk);
        assert_eq!(dangerous.confidence, large.confidence);
    }

    #[test]
    fn saturated_vector_scores_at_most_hundred() {
        let a = Scorer::default().score(&SignalVector::splat(1.0), &WeightVector::uniform());
        assert!(a.confidence <= 100.0 && a.confidence > 99.999);
        assert!(a.risk <= 100.0);
        assert!(a.high_risk);
    }
}
