//! Per-run inputs and outputs of the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use verdict_core::errors::VerdictResult;
use verdict_core::{Degradation, RecordId, SignalKind, WeightVector};
use verdict_scoring::RawSignals;

/// One pull request to assess.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawReview {
    /// Defaults to the configured mesh repository id.
    pub repository_id: Option<String>,
    pub pr_id: u64,
    /// CI run timestamp; defaults to now. Replays of a run must pass the same value.
    pub run_at: Option<DateTime<Utc>>,
    pub signals: RawSignals,
}

/// The outbound summary of one run, for comment posting and dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub record_id: RecordId,
    pub category: String,
    pub confidence: f64,
    pub risk: f64,
    pub high_risk: bool,
    /// Weights the scores were computed with.
    pub weights: WeightVector,
    /// Signals that came from the trend prior.
    pub substituted: Vec<SignalKind>,
    /// False when the record already existed (replayed run) or could not be stored.
    pub recorded: bool,
    pub degradations: Vec<Degradation>,
}

impl RunSummary {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn to_json(&self) -> VerdictResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What happened to an outcome handed to [`crate::ReviewEngine::reconcile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileStatus {
    /// Reward recorded and folded into the weights.
    Applied { weights: WeightVector, clock: u64 },
    /// Reward recorded; the weight lock was busy, so the next run applies it.
    Deferred,
    /// The same outcome was already recorded.
    AlreadyRecorded,
}
