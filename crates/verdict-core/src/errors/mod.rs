//! Error taxonomy for the scoring engine.
//!
//! Every condition except [`VerdictError::NotFound`], [`VerdictError::OutcomeConflict`]
//! and configuration errors is recoverable: callers degrade (uniform weights,
//! prior-only signals, last-known-good state) instead of aborting a review.

mod storage_error;

pub use storage_error::StorageError;

use crate::signal::SignalKind;

/// Result alias used across the workspace.
pub type VerdictResult<T> = Result<T, VerdictError>;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum VerdictError {
    #[error("signal {signal} missing for category {category}")]
    MissingSignal { signal: SignalKind, category: String },

    #[error("schema mismatch: expected keys [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },

    #[error("review memory unreadable: {details}")]
    StoreCorruption { details: String },

    #[error("lock on {resource} not acquired within {waited_ms}ms")]
    LockTimeout { resource: String, waited_ms: u64 },

    #[error("record not found: {id}")]
    NotFound { id: String },

    #[error("outcome for {id} already recorded as {recorded:.4}, refusing {attempted:.4}")]
    OutcomeConflict {
        id: String,
        recorded: f64,
        attempted: f64,
    },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl VerdictError {
    /// Whether the engine may continue the review after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::NotFound { .. } | Self::OutcomeConflict { .. } | Self::ConfigError { .. }
        )
    }

    /// Short machine-readable name of the taxonomy entry.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingSignal { .. } => "missing_signal",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::StoreCorruption { .. } => "store_corruption",
            Self::LockTimeout { .. } => "lock_timeout",
            Self::NotFound { .. } => "not_found",
            Self::OutcomeConflict { .. } => "outcome_conflict",
            Self::InvalidInput { .. } => "invalid_input",
            Self::ConfigError { .. } => "config_error",
            Self::StorageError(_) => "storage_error",
            Self::SerializationError(_) => "serialization_error",
        }
    }
}
