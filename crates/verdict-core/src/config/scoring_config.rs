use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::signal::WeightVector;

/// Signal building and scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Fixed secondary weight profile for risk, independent of the tuned weights.
    pub risk_profile: WeightVector,
    /// Risk at or above which a run is flagged high risk.
    pub high_risk_threshold: f64,
    /// Base risk in [0, 1] per category label (lowercase).
    pub category_risk: BTreeMap<String, f64>,
    /// Severity in [0, 1] per AI severity tag (lowercase).
    pub severity_tags: BTreeMap<String, f64>,
    /// Tag terms that floor the severity signal.
    pub high_risk_keywords: Vec<String>,
    /// Severity floor applied when a high-risk keyword appears.
    pub keyword_severity_floor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            risk_profile: WeightVector::normalized(defaults::DEFAULT_RISK_PROFILE),
            high_risk_threshold: defaults::DEFAULT_HIGH_RISK_THRESHOLD,
            category_risk: to_table(defaults::CATEGORY_RISKS),
            severity_tags: to_table(defaults::SEVERITY_TAGS),
            high_risk_keywords: defaults::HIGH_RISK_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            keyword_severity_floor: defaults::HIGH_RISK_KEYWORD_FLOOR,
        }
    }
}

fn to_table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}
