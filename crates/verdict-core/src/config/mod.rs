//! Engine configuration, loaded from TOML.
//!
//! # Examples
//!
//! ```
//! use verdict_core::config::VerdictConfig;
//!
//! let config = VerdictConfig::from_toml("[learning]\nlearning_rate = 0.2").unwrap();
//! assert!((config.learning.learning_rate - 0.2).abs() < f64::EPSILON);
//! assert_eq!(config.storage.lock_timeout_ms, 2_000);
//! ```

pub mod defaults;
mod learning_config;
mod mesh_config;
mod observability_config;
mod prediction_config;
mod scoring_config;
mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use learning_config::LearningConfig;
pub use mesh_config::MeshConfig;
pub use observability_config::ObservabilityConfig;
pub use prediction_config::PredictionConfig;
pub use scoring_config::ScoringConfig;
pub use storage_config::StorageConfig;

use crate::constants::MAX_LEARNING_RATE;
use crate::errors::{VerdictError, VerdictResult};

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub learning: LearningConfig,
    pub prediction: PredictionConfig,
    pub mesh: MeshConfig,
    pub observability: ObservabilityConfig,
}

impl VerdictConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str) -> VerdictResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| VerdictError::ConfigError {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: &Path) -> VerdictResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| VerdictError::ConfigError {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml(&source)
    }

    /// Reject values outside their documented ranges.
    pub fn validate(&self) -> VerdictResult<()> {
        let rate = self.learning.learning_rate;
        if !(rate > 0.0 && rate <= MAX_LEARNING_RATE) {
            return config_err(format!(
                "learning_rate must lie in (0, {MAX_LEARNING_RATE}], got {rate}"
            ));
        }
        let threshold = self.scoring.high_risk_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return config_err(format!(
                "high_risk_threshold must lie in [0, 100], got {threshold}"
            ));
        }
        let unit_tables = [
            ("category_risk", &self.scoring.category_risk),
            ("severity_tags", &self.scoring.severity_tags),
        ];
        for (table, entries) in unit_tables {
            if let Some((name, value)) = entries.iter().find(|(_, v)| !(0.0..=1.0).contains(*v)) {
                return config_err(format!("{table}.{name} must lie in [0, 1], got {value}"));
            }
        }
        if !(0.0..=1.0).contains(&self.scoring.keyword_severity_floor) {
            return config_err("keyword_severity_floor must lie in [0, 1]".to_string());
        }
        let shift = self.prediction.max_prior_shift;
        if !(shift > 0.0 && shift <= 1.0) {
            return config_err(format!("max_prior_shift must lie in (0, 1], got {shift}"));
        }
        if self.prediction.stats_window == 0 {
            return config_err("stats_window must be positive".to_string());
        }
        if self.storage.read_pool_size == 0 {
            return config_err("read_pool_size must be positive".to_string());
        }
        if self.mesh.repository_id.trim().is_empty() {
            return config_err("mesh.repository_id must not be empty".to_string());
        }
        Ok(())
    }
}

fn config_err(reason: String) -> VerdictResult<()> {
    Err(VerdictError::ConfigError { reason })
}
