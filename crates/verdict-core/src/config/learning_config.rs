use serde::{Deserialize, Serialize};

use super::defaults;

/// Adaptive weight tuner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Exponential update rate α. Must lie in (0, 0.3].
    pub learning_rate: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
        }
    }
}
