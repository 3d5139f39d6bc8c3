use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recoverable failure that the engine absorbed by falling back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degradation {
    /// Component that failed (e.g. "weights", "review_memory").
    pub component: String,
    /// Taxonomy entry of the failure.
    pub failure: String,
    /// What was used instead.
    pub fallback: String,
    pub timestamp: DateTime<Utc>,
}

impl Degradation {
    pub fn new(
        component: impl Into<String>,
        failure: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            failure: failure.into(),
            fallback: fallback.into(),
            timestamp: Utc::now(),
        }
    }
}
