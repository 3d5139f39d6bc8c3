use serde::{Deserialize, Serialize};

use super::defaults;

/// Trend model and rolling statistics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Records per rolling statistics window.
    pub stats_window: usize,
    /// Largest per-signal move of an established category prior in one refit.
    pub max_prior_shift: f64,
    /// Sample count at which a category prior counts as established.
    pub abundant_samples: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            stats_window: defaults::DEFAULT_STATS_WINDOW,
            max_prior_shift: defaults::DEFAULT_MAX_PRIOR_SHIFT,
            abundant_samples: defaults::DEFAULT_ABUNDANT_SAMPLES,
        }
    }
}
