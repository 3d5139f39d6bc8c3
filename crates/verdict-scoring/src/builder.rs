//! Signal Vector Builder: normalizes raw per-PR facts into a complete vector.
//!
//! A partially observed PR still yields a usable vector: any missing or
//! malformed input is replaced by the trend model's prior for the category,
//! never by zero, and never by an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use verdict_core::config::ScoringConfig;
use verdict_core::{IPriorSource, SignalKind, SignalVector};

/// Category label used when the review generator supplies none.
pub const DEFAULT_CATEGORY: &str = "general";

/// Raw, possibly incomplete facts about one pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSignals {
    /// Category label from the AI review generator.
    pub category: Option<String>,
    /// Categories of the touched files (e.g. "security", "test update").
    pub touched_categories: Vec<String>,
    /// Changed line count. Negative values are malformed.
    pub diff_lines: Option<i64>,
    /// AI self-reported severity in [0, 1].
    pub ai_severity: Option<f64>,
    /// AI severity tags, used when no numeric severity is present.
    pub severity_tags: Vec<String>,
    /// Historical mean risk of the category in [0, 1]. The engine fills it
    /// from the review memory when the caller leaves it out.
    pub historical_risk: Option<f64>,
}

/// A complete vector plus the signals that had to come from the prior.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSignals {
    pub category: String,
    pub vector: SignalVector,
    pub substituted: Vec<SignalKind>,
}

impl BuiltSignals {
    pub fn is_complete(&self) -> bool {
        self.substituted.is_empty()
    }
}

/// Lowercased, trimmed category label, or [`DEFAULT_CATEGORY`].
pub fn normalize_category(label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_lowercase(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// `min(1, ln(1 + lines) / 10)`: saturates around 22k changed lines.
pub fn diff_size_risk(lines: u64) -> f64 {
    ((lines as f64).ln_1p() / 10.0).min(1.0)
}

/// Builds [`SignalVector`]s from [`RawSignals`].
pub struct SignalBuilder<'a> {
    config: &'a ScoringConfig,
}

impl<'a> SignalBuilder<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// Build a complete vector. Never fails.
    pub fn build(&self, raw: &RawSignals, priors: &dyn IPriorSource) -> BuiltSignals {
        let category = normalize_category(raw.category.as_deref());
        let observed = [
            (SignalKind::Diff, self.diff(raw)),
            (SignalKind::Category, self.category_risk(&category, raw)),
            (SignalKind::Severity, self.severity(raw)),
            (SignalKind::History, unit(raw.historical_risk)),
        ];

        let mut prior: Option<SignalVector> = None;
        let mut vector = SignalVector::default();
        let mut substituted = Vec::new();
        for (kind, value) in observed {
            match value {
                Some(value) => vector.set(kind, value),
                None => {
                    let prior = prior.get_or_insert_with(|| priors.prior(&category));
                    warn!(
                        signal = %kind,
                        category = %category,
                        prior = prior.get(kind),
                        "signal missing; substituting trend prior"
                    );
                    vector.set(kind, prior.get(kind));
                    substituted.push(kind);
                }
            }
        }

        debug!(category = %category, signals = ?vector.values(), "signal vector built");
        BuiltSignals {
            category,
            vector,
            substituted,
        }
    }

    fn diff(&self, raw: &RawSignals) -> Option<f64> {
        let lines = raw.diff_lines?;
        u64::try_from(lines).ok().map(diff_size_risk)
    }

    /// Highest configured risk among the label and touched-file categories.
    fn category_risk(&self, category: &str, raw: &RawSignals) -> Option<f64> {
        std::iter::once(category.to_string())
            .chain(
                raw.touched_categories
                    .iter()
                    .map(|c| normalize_category(Some(c))),
            )
            .filter_map(|c| self.config.category_risk.get(&c).copied())
            .reduce(f64::max)
    }

    /// Numeric severity when valid, else the strongest known tag, floored
    /// when any tag names a high-risk term.
    fn severity(&self, raw: &RawSignals) -> Option<f64> {
        if let Some(score) = unit(raw.ai_severity) {
            return Some(score);
        }
        let tags: Vec<String> = raw
            .severity_tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .collect();
        let tagged = tags
            .iter()
            .filter_map(|t| self.config.severity_tags.get(t).copied())
            .reduce(f64::max);
        let keyword_hit = tags.iter().any(|tag| {
            self.config
                .high_risk_keywords
                .iter()
                .any(|k| tag.contains(k.as_str()))
        });
        match (tagged, keyword_hit) {
            (Some(score), true) => Some(score.max(self.config.keyword_severity_floor)),
            (Some(score), false) => Some(score),
            (None, true) => Some(self.config.keyword_severity_floor),
            (None, false) => None,
        }
    }
}

/// A finite value saturated into [0, 1]; NaN counts as missing.
fn unit(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan()).map(|v| v.clamp(0.0, 1.0))
}
