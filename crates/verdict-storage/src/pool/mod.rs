//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};
use std::time::Duration;

use verdict_core::errors::VerdictResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the read connection pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    /// `None` in memory: extra in-memory connections would be isolated databases.
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    /// The writer goes first so the file exists in WAL mode before readers attach.
    pub fn open(path: &Path, read_pool_size: usize, lock_timeout: Duration) -> VerdictResult<Self> {
        let writer = WriteConnection::open(path, lock_timeout)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool (for testing). All reads go through the writer.
    pub fn open_in_memory(lock_timeout: Duration) -> VerdictResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory(lock_timeout)?,
            readers: None,
            db_path: None,
        })
    }
}
