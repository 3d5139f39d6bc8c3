//! The single writer connection and its scoped exclusive lock.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};

use verdict_core::errors::{StorageError, VerdictError, VerdictResult};

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// Poll interval while another thread holds the in-process writer.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Owns the writer connection. Access is serialized in-process by a mutex
/// and across processes by SQLite's write lock; both waits share one
/// bounded budget.
pub struct WriteConnection {
    conn: Mutex<Connection>,
    lock_timeout: Duration,
}

impl WriteConnection {
    pub fn open(path: &Path, lock_timeout: Duration) -> VerdictResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        Self::from_connection(conn, lock_timeout)
    }

    pub fn open_in_memory(lock_timeout: Duration) -> VerdictResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        Self::from_connection(conn, lock_timeout)
    }

    fn from_connection(conn: Connection, lock_timeout: Duration) -> VerdictResult<Self> {
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            lock_timeout,
        })
    }

    /// Run `f` on the writer connection outside any explicit transaction.
    pub fn with_conn_sync<F, T>(&self, f: F) -> VerdictResult<T>
    where
        F: FnOnce(&Connection) -> VerdictResult<T>,
    {
        let guard = self.acquire("writer", Instant::now())?;
        f(&guard)
    }

    /// Run `f` inside an immediate (write-locked) transaction.
    ///
    /// Commits when `f` succeeds. On error, or if `f` panics, the transaction
    /// is dropped and rolled back, releasing the lock.
    pub fn with_exclusive<F, T>(&self, resource: &str, f: F) -> VerdictResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> VerdictResult<T>,
    {
        let started = Instant::now();
        let mut guard = self.acquire(resource, started)?;

        let remaining = self.lock_timeout.saturating_sub(started.elapsed());
        guard
            .busy_timeout(remaining)
            .map_err(|e| to_storage_err(e.to_string()))?;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| self.classify(e, resource, started))?;

        let value = f(&tx)?;
        tx.commit().map_err(|e| self.classify(e, resource, started))?;
        Ok(value)
    }

    /// Bounded wait for the in-process writer.
    fn acquire(&self, resource: &str, started: Instant) -> VerdictResult<MutexGuard<'_, Connection>> {
        loop {
            match self.conn.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(e)) => {
                    return Err(StorageError::LockPoisoned {
                        details: e.to_string(),
                    }
                    .into())
                }
                Err(TryLockError::WouldBlock) => {
                    if started.elapsed() >= self.lock_timeout {
                        return Err(self.timeout(resource, started));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }

    fn classify(&self, err: rusqlite::Error, resource: &str, started: Instant) -> VerdictError {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                self.timeout(resource, started)
            }
            _ => to_storage_err(format!("{resource}: {err}")),
        }
    }

    fn timeout(&self, resource: &str, started: Instant) -> VerdictError {
        let waited_ms = started.elapsed().as_millis() as u64;
        tracing::warn!(resource, waited_ms, "write lock not acquired in time");
        VerdictError::LockTimeout {
            resource: resource.to_string(),
            waited_ms,
        }
    }
}
