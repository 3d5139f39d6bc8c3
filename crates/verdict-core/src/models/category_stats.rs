//! Per-category rolling statistics.
//!
//! Stats are always derived from a [`CategoryTally`] of additive sums, never
//! from pre-aggregated means, so two tallies can be concatenated and the
//! aggregates recomputed without double-counting bias.

use serde::{Deserialize, Serialize};

use super::review_record::ReviewRecord;
use crate::constants::TREND_DEAD_BAND;

/// Direction of a category's risk between two consecutive windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Mean risk fell by more than the dead band.
    Improving,
    Stable,
    /// Mean risk rose by more than the dead band.
    Declining,
}

impl Trend {
    /// Classify a risk delta (current minus previous window, score points).
    pub fn classify(delta: f64) -> Self {
        if delta < -TREND_DEAD_BAND {
            Self::Improving
        } else if delta > TREND_DEAD_BAND {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

/// Additive sufficient statistics for the current and previous window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTally {
    pub risk_sum: f64,
    pub confidence_sum: f64,
    pub count: u64,
    pub previous_risk_sum: f64,
    pub previous_count: u64,
}

impl CategoryTally {
    /// Tally a current window and the window immediately before it.
    pub fn from_windows(current: &[ReviewRecord], previous: &[ReviewRecord]) -> Self {
        Self {
            risk_sum: current.iter().map(|r| r.risk).sum(),
            confidence_sum: current.iter().map(|r| r.confidence).sum(),
            count: current.len() as u64,
            previous_risk_sum: previous.iter().map(|r| r.risk).sum(),
            previous_count: previous.len() as u64,
        }
    }

    /// Concatenate another tally into this one.
    pub fn absorb(&mut self, other: &CategoryTally) {
        self.risk_sum += other.risk_sum;
        self.confidence_sum += other.confidence_sum;
        self.count += other.count;
        self.previous_risk_sum += other.previous_risk_sum;
        self.previous_count += other.previous_count;
    }
}

/// Derived statistics for one category. Recomputed on demand, never persisted
/// as a source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub mean_risk: f64,
    pub mean_confidence: f64,
    pub count: u64,
    /// Current minus previous window mean risk; `None` when either window is empty.
    pub trend_delta: Option<f64>,
    pub trend: Option<Trend>,
}

impl CategoryStats {
    pub fn from_tally(category: impl Into<String>, tally: &CategoryTally) -> Self {
        let mean = |sum: f64, count: u64| if count == 0 { 0.0 } else { sum / count as f64 };
        let trend_delta = (tally.count > 0 && tally.previous_count > 0).then(|| {
            mean(tally.risk_sum, tally.count) - mean(tally.previous_risk_sum, tally.previous_count)
        });
        Self {
            category: category.into(),
            mean_risk: mean(tally.risk_sum, tally.count),
            mean_confidence: mean(tally.confidence_sum, tally.count),
            count: tally.count,
            trend_delta,
            trend: trend_delta.map(Trend::classify),
        }
    }

    /// Stats straight from two record windows.
    pub fn from_windows(
        category: impl Into<String>,
        current: &[ReviewRecord],
        previous: &[ReviewRecord],
    ) -> Self {
        Self::from_tally(category, &CategoryTally::from_windows(current, previous))
    }
}
