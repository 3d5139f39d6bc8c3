//! StorageEngine: owns the connection pool, implements IReviewMemory, and
//! runs every read-modify-write of the tuning state under the scoped lock.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use verdict_core::config::StorageConfig;
use verdict_core::errors::{VerdictError, VerdictResult};
use verdict_core::{
    CategoryStats, CategoryTally, IReviewMemory, PriorSnapshot, RecordId, ReviewRecord, Reward,
    WeightState, WeightVector,
};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::record_query::RecordBatch;
use crate::queries::{maintenance, mesh_ops, record_crud, record_query, weight_state_ops};
use crate::recovery;

const RECORDS: &str = "review_records";
const WEIGHTS: &str = "weight_state";
const MESH: &str = "mesh_state";

/// Result of folding pending rewards into the weights.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRewards {
    /// Rewards applied in this pass.
    pub applied: usize,
    /// Weight state after the pass.
    pub state: WeightState,
    /// The stored weights did not match the signal schema and were reset to uniform.
    pub schema_reset: bool,
}

/// Result of a locked read-modify-write of the stored mesh snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCommit<T> {
    pub state: T,
    pub digest: String,
    /// False when the digest matched the stored one and the write was skipped.
    pub changed: bool,
}

/// The main storage engine.
pub struct StorageEngine {
    pool: ConnectionPool,
    /// Where a corrupt predecessor was moved on open, if one was found.
    recovered: Option<PathBuf>,
    /// Unreadable records skipped by reads since the last `take_skipped_records`.
    skipped: AtomicUsize,
}

impl StorageEngine {
    /// Open a store backed by a file on disk, quarantining a corrupt one first.
    pub fn open(path: &Path, config: &StorageConfig) -> VerdictResult<Self> {
        let recovered = recovery::quarantine_if_corrupt(path)?;
        let pool = ConnectionPool::open(
            path,
            config.read_pool_size,
            Duration::from_millis(config.lock_timeout_ms),
        )?;
        let engine = Self {
            pool,
            recovered,
            skipped: AtomicUsize::new(0),
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory store (for testing). Reads go through the writer.
    pub fn open_in_memory(config: &StorageConfig) -> VerdictResult<Self> {
        let pool = ConnectionPool::open_in_memory(Duration::from_millis(config.lock_timeout_ms))?;
        let engine = Self {
            pool,
            recovered: None,
            skipped: AtomicUsize::new(0),
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> VerdictResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            let version = migrations::run_migrations(conn)?;
            debug!(version, "review memory schema ready");
            Ok(())
        })
    }

    /// Path of the quarantined corrupt store replaced on open.
    pub fn recovered_corruption(&self) -> Option<&Path> {
        self.recovered.as_deref()
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.pool.db_path.as_deref()
    }

    /// Number of unreadable records skipped since the last call, resetting the count.
    pub fn take_skipped_records(&self) -> usize {
        self.skipped.swap(0, Ordering::Relaxed)
    }

    fn keep(&self, batch: RecordBatch) -> Vec<ReviewRecord> {
        self.note_skipped(batch.skipped);
        batch.records
    }

    fn note_skipped(&self, skipped: usize) {
        if skipped > 0 {
            self.skipped.fetch_add(skipped, Ordering::Relaxed);
        }
    }

    /// Read on a pooled reader when file-backed, else on the writer.
    fn with_reader<F, T>(&self, f: F) -> VerdictResult<T>
    where
        F: FnOnce(&Connection) -> VerdictResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn_sync(f),
        }
    }

    /// Attach a reward, leaving it pending for the tuner.
    /// `Ok(false)` when the same reward was already recorded.
    pub fn record_outcome(&self, id: &RecordId, reward: Reward) -> VerdictResult<bool> {
        self.pool
            .writer
            .with_exclusive(RECORDS, |tx| record_crud::record_outcome(tx, id, reward))
    }

    /// Look up one record.
    pub fn get(&self, id: &RecordId) -> VerdictResult<Option<ReviewRecord>> {
        self.with_reader(|conn| record_query::get_record(conn, id))
    }

    /// Current weight state. `SchemaMismatch` when the stored vectors are stale.
    pub fn weight_state(&self) -> VerdictResult<WeightState> {
        self.with_reader(weight_state_ops::load_weight_state)
    }

    /// Overwrite stale state with uniform weights.
    pub fn reset_weight_state(&self) -> VerdictResult<WeightState> {
        let state = self
            .pool
            .writer
            .with_exclusive(WEIGHTS, |tx| weight_state_ops::reset_weight_state(tx))?;
        warn!(clock = state.clock, "weight state reset to uniform");
        Ok(state)
    }

    /// Fold every pending reward into the weights, oldest first, in one
    /// locked read-modify-write. The clock moves once per weight change.
    pub fn apply_pending_rewards<F>(&self, mut update: F) -> VerdictResult<AppliedRewards>
    where
        F: FnMut(&WeightVector, &ReviewRecord) -> WeightVector,
    {
        let queued = self.with_reader(record_query::pending_rewards)?;
        if queued.records.is_empty() {
            self.note_skipped(queued.skipped);
            return match self.weight_state() {
                Ok(state) => Ok(AppliedRewards {
                    applied: 0,
                    state,
                    schema_reset: false,
                }),
                Err(VerdictError::SchemaMismatch { .. }) => Ok(AppliedRewards {
                    applied: 0,
                    state: self.reset_weight_state()?,
                    schema_reset: true,
                }),
                Err(e) => Err(e),
            };
        }

        let result = self.pool.writer.with_exclusive(WEIGHTS, |tx| {
            let (mut state, schema_reset) = load_or_reset(tx)?;
            let pending = self.keep(record_query::pending_rewards(tx)?);
            for record in &pending {
                let next = update(&state.weights, record);
                if next != state.weights {
                    state.weights = next;
                    state.clock += 1;
                }
                record_crud::mark_reward_applied(tx, &record.id)?;
            }
            if !pending.is_empty() || schema_reset {
                state.updated_at = Some(Utc::now());
                weight_state_ops::save_weight_state(tx, &state)?;
            }
            Ok(AppliedRewards {
                applied: pending.len(),
                state,
                schema_reset,
            })
        })?;
        if result.applied > 0 {
            info!(
                applied = result.applied,
                clock = result.state.clock,
                weights = ?result.state.weights.values(),
                "pending rewards applied"
            );
        }
        Ok(result)
    }

    /// Replace the local weights (e.g. with the mesh's shared weights).
    pub fn set_weights(&self, weights: WeightVector) -> VerdictResult<WeightState> {
        self.pool.writer.with_exclusive(WEIGHTS, |tx| {
            let (mut state, _) = load_or_reset(tx)?;
            state.weights = weights;
            state.clock += 1;
            state.updated_at = Some(Utc::now());
            weight_state_ops::save_weight_state(tx, &state)?;
            Ok(state)
        })
    }

    /// Commit refreshed category priors. The clock is untouched.
    pub fn update_priors(&self, priors: PriorSnapshot) -> VerdictResult<WeightState> {
        self.pool.writer.with_exclusive(WEIGHTS, |tx| {
            let (mut state, _) = load_or_reset(tx)?;
            state.priors = priors;
            state.updated_at = Some(Utc::now());
            weight_state_ops::save_weight_state(tx, &state)?;
            Ok(state)
        })
    }

    /// The stored merged mesh snapshot and its digest.
    pub fn mesh_state<T: DeserializeOwned>(&self) -> VerdictResult<Option<(T, String)>> {
        self.with_reader(mesh_ops::load_mesh_state::<T>)
    }

    /// Read-modify-write of the stored mesh snapshot under the lock.
    ///
    /// `merge` receives the stored state (`None` when absent or unreadable)
    /// and returns the next state with its digest. A digest equal to the
    /// stored one skips the write.
    pub fn merge_mesh_state<T, F>(&self, merge: F) -> VerdictResult<MeshCommit<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> VerdictResult<(T, String)>,
    {
        self.pool.writer.with_exclusive(MESH, |tx| {
            let (stored, stored_digest) = match mesh_ops::load_mesh_state::<T>(tx) {
                Ok(Some((state, digest))) => (Some(state), Some(digest)),
                Ok(None) => (None, None),
                Err(e @ VerdictError::SchemaMismatch { .. }) => {
                    warn!(error = %e, "stored mesh state unreadable; rebuilding");
                    (None, None)
                }
                Err(e) => return Err(e),
            };
            let (state, digest) = merge(stored)?;
            let changed = stored_digest.as_deref() != Some(digest.as_str());
            if changed {
                mesh_ops::save_mesh_state(tx, &state, &digest)?;
            } else {
                debug!("mesh state unchanged; commit skipped");
            }
            Ok(MeshCommit {
                state,
                digest,
                changed,
            })
        })
    }

    /// Stats over the latest `window` records of a category, with the trend
    /// against the `window` before it.
    pub fn category_stats(&self, category: &str, window: usize) -> VerdictResult<CategoryStats> {
        let (tally, skipped) = self.with_reader(|conn| category_tally(conn, category, window))?;
        self.note_skipped(skipped);
        Ok(CategoryStats::from_tally(category, &tally))
    }

    /// Additive tallies of every category, read from one snapshot.
    pub fn category_tallies(&self, window: usize) -> VerdictResult<BTreeMap<String, CategoryTally>> {
        self.with_reader(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| crate::to_storage_err(e.to_string()))?;
            let mut tallies = BTreeMap::new();
            for category in record_query::categories(&tx)? {
                let (tally, skipped) = category_tally(&tx, &category, window)?;
                self.note_skipped(skipped);
                tallies.insert(category, tally);
            }
            Ok(tallies)
        })
    }

    /// The latest `size` records across categories, newest first.
    pub fn recent(&self, size: usize) -> VerdictResult<Vec<ReviewRecord>> {
        let batch = self.with_reader(|conn| record_query::recent(conn, size))?;
        Ok(self.keep(batch))
    }

    pub fn record_count(&self) -> VerdictResult<u64> {
        self.with_reader(record_query::count_records)
    }

    /// Records with a reward not yet applied to the weights.
    pub fn pending_count(&self) -> VerdictResult<usize> {
        let batch = self.with_reader(record_query::pending_rewards)?;
        Ok(self.keep(batch).len())
    }

    /// `PRAGMA integrity_check` on the live store.
    pub fn check_integrity(&self) -> VerdictResult<bool> {
        self.pool
            .writer
            .with_conn_sync(maintenance::integrity_check)
    }
}

/// Load the state for a read-modify-write, resetting stale vectors in place.
fn load_or_reset(conn: &Connection) -> VerdictResult<(WeightState, bool)> {
    match weight_state_ops::load_weight_state(conn) {
        Ok(state) => Ok((state, false)),
        Err(VerdictError::SchemaMismatch { expected, found }) => {
            warn!(%expected, %found, "stored weights do not match the signal schema");
            Ok((weight_state_ops::reset_weight_state(conn)?, true))
        }
        Err(e) => Err(e),
    }
}

/// Tally of one category plus the number of unreadable rows skipped.
fn category_tally(
    conn: &Connection,
    category: &str,
    window: usize,
) -> VerdictResult<(CategoryTally, usize)> {
    let window = window.max(1);
    let batch = record_query::window(conn, category, window.saturating_mul(2))?;
    let (current, previous) = batch.records.split_at(batch.records.len().min(window));
    Ok((CategoryTally::from_windows(current, previous), batch.skipped))
}

impl IReviewMemory for StorageEngine {
    fn append(&self, record: &ReviewRecord) -> VerdictResult<bool> {
        let inserted = self
            .pool
            .writer
            .with_exclusive(RECORDS, |tx| record_crud::append_record(tx, record))?;
        if !inserted {
            debug!(id = %record.id, "record already present; append skipped");
        }
        Ok(inserted)
    }

    fn outcome(&self, id: &RecordId, reward: Reward) -> VerdictResult<()> {
        self.record_outcome(id, reward).map(|_| ())
    }

    fn window(&self, category: &str, size: usize) -> VerdictResult<Vec<ReviewRecord>> {
        let batch = self.with_reader(|conn| record_query::window(conn, category, size))?;
        Ok(self.keep(batch))
    }

    fn snapshot(&self) -> VerdictResult<Vec<ReviewRecord>> {
        let batch = self.with_reader(record_query::all_records)?;
        Ok(self.keep(batch))
    }
}
