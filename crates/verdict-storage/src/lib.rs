//! # verdict-storage
//!
//! SQLite persistence for the review memory and the tuning state.
//!
//! - One writer connection; every mutation is a single `BEGIN IMMEDIATE`
//!   transaction, so readers see either the old or the new complete state.
//! - Lock acquisition waits at most `lock_timeout_ms`, then fails with
//!   `LockTimeout`. The transaction guard rolls back on drop, releasing the
//!   lock on every exit path.
//! - File-backed stores read through a pool of read-only WAL connections,
//!   so snapshot reads never block appends.
//! - A store that is not a database or fails its integrity check is moved
//!   aside and replaced by a fresh segment on open.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod recovery;

pub use engine::{AppliedRewards, MeshCommit, StorageEngine};

use verdict_core::errors::{StorageError, VerdictError};

/// Wrap a message as a storage-layer error.
pub(crate) fn to_storage_err(message: impl Into<String>) -> VerdictError {
    VerdictError::StorageError(StorageError::SqliteError {
        message: message.into(),
    })
}
