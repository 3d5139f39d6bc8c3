use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signal::{SignalVector, WeightVector};

/// Fitted mean signal vector of one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrior {
    pub mean: SignalVector,
    /// Records the mean was fitted over.
    pub samples: u64,
}

/// Category priors as last fitted by the trend model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorSnapshot {
    pub categories: BTreeMap<String, CategoryPrior>,
    pub fitted_at: Option<DateTime<Utc>>,
}

impl PriorSnapshot {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// The persisted tuning state read by dashboards and written only by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightState {
    pub weights: WeightVector,
    /// Logical clock, incremented on every local weight update.
    pub clock: u64,
    pub priors: PriorSnapshot,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for WeightState {
    fn default() -> Self {
        Self {
            weights: WeightVector::uniform(),
            clock: 0,
            priors: PriorSnapshot::default(),
            updated_at: None,
        }
    }
}
