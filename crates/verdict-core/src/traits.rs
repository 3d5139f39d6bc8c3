//! Seams between the engine's subsystems.

use crate::errors::VerdictResult;
use crate::models::{RecordId, ReviewRecord, Reward};
use crate::signal::SignalVector;

/// Source of fallback signal vectors for categories.
pub trait IPriorSource {
    /// Prior for `category`; an unseen category yields the global mean.
    fn prior(&self, category: &str) -> SignalVector;
}

/// Append-only memory of scored runs.
pub trait IReviewMemory {
    /// Append a record. Returns `false` when a record with the same id
    /// already exists (replayed run); the store is left unchanged.
    fn append(&self, record: &ReviewRecord) -> VerdictResult<bool>;

    /// Attach the outcome reward to an existing record.
    ///
    /// `NotFound` for an unknown id; a no-op for a repeated identical reward.
    fn outcome(&self, id: &RecordId, reward: Reward) -> VerdictResult<()>;

    /// The most recent `size` records of `category`, newest first.
    fn window(&self, category: &str, size: usize) -> VerdictResult<Vec<ReviewRecord>>;

    /// Every record, oldest first, read from a consistent snapshot.
    fn snapshot(&self) -> VerdictResult<Vec<ReviewRecord>>;
}
