//! # verdict-core
//!
//! Foundation crate for the verdict scoring engine.
//! Defines the signal schema, weight vectors, review records, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod signal;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::VerdictConfig;
pub use errors::{StorageError, VerdictError, VerdictResult};
pub use models::{
    CategoryPrior, CategoryStats, CategoryTally, Degradation, Outcome, PriorSnapshot, RecordId,
    ReviewRecord, Reward, Trend, WeightState,
};
pub use signal::{SignalKind, SignalVector, WeightVector};
pub use traits::{IPriorSource, IReviewMemory};
