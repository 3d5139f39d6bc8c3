use serde::{Deserialize, Serialize};

use super::defaults;

/// Review memory persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub db_path: String,
    /// Bounded wait for the exclusive write lock before giving up (milliseconds).
    pub lock_timeout_ms: u64,
    /// Number of read-only connections for snapshot reads.
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_PATH.to_string(),
            lock_timeout_ms: defaults::DEFAULT_LOCK_TIMEOUT_MS,
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
        }
    }
}
