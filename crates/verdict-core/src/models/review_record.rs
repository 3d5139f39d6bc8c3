use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::Reward;
use crate::signal::SignalVector;

/// Identity of one scoring run: (repository, pull request, run timestamp).
///
/// The timestamp is truncated to microseconds, the precision the store
/// persists, so an id survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    pub repository_id: String,
    pub pr_id: u64,
    pub run_at: DateTime<Utc>,
}

impl RecordId {
    pub fn new(repository_id: impl Into<String>, pr_id: u64, run_at: DateTime<Utc>) -> Self {
        Self {
            repository_id: repository_id.into(),
            pr_id,
            run_at: run_at.trunc_subsecs(6),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}@{}",
            self.repository_id,
            self.pr_id,
            self.run_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
        )
    }
}

/// One scored run, as remembered by the review memory.
///
/// Immutable apart from `reward`, which a later reconciliation sets at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: RecordId,
    pub category: String,
    pub signals: SignalVector,
    /// Confidence in [0, 100].
    pub confidence: f64,
    /// Risk in [0, 100].
    pub risk: f64,
    pub reward: Option<Reward>,
}

impl ReviewRecord {
    pub fn new(
        id: RecordId,
        category: impl Into<String>,
        signals: SignalVector,
        confidence: f64,
        risk: f64,
    ) -> Self {
        Self {
            id,
            category: category.into(),
            signals,
            confidence,
            risk,
            reward: None,
        }
    }

    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.reward = Some(reward);
        self
    }
}
