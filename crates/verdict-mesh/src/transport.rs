//! Delivery of mesh snapshots between repositories.
//!
//! The engine only needs to fetch the latest remote state and publish a
//! merged one; the network layer behind this seam is out of scope.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

use verdict_core::errors::{StorageError, VerdictError, VerdictResult};

use crate::state::MeshState;

pub trait MeshTransport {
    /// The latest remote state, or `None` when nothing has been published yet.
    fn fetch(&self) -> VerdictResult<Option<MeshState>>;

    /// Broadcast a merged state.
    fn publish(&self, state: &MeshState) -> VerdictResult<()>;
}

/// Shared JSON file, e.g. a synced directory or CI artifact.
///
/// Publishing writes a temporary sibling and renames it over the target, so
/// readers never observe a half-written file. Each publish gets its own
/// temporary name, so concurrent publishers never rename each other's file.
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        PathBuf::from(name)
    }
}

fn io_err(path: &Path, e: std::io::Error) -> VerdictError {
    StorageError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
    .into()
}

impl MeshTransport for FileTransport {
    fn fetch(&self) -> VerdictResult<Option<MeshState>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&self.path, e)),
        };
        let state: MeshState = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), members = state.len(), "mesh state fetched");
        Ok(Some(state))
    }

    fn publish(&self, state: &MeshState) -> VerdictResult<()> {
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path, e));
        }
        debug!(path = %self.path.display(), members = state.len(), "mesh state published");
        Ok(())
    }
}

/// Process-local transport, for tests and single-host setups.
#[derive(Default)]
pub struct InMemoryTransport {
    remote: Mutex<Option<MeshState>>,
    published: Mutex<Vec<MeshState>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose remote side already holds `state`.
    pub fn with_remote(state: MeshState) -> Self {
        Self {
            remote: Mutex::new(Some(state)),
            published: Mutex::new(Vec::new()),
        }
    }

    /// Every state published so far, oldest first.
    pub fn published(&self) -> Vec<MeshState> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> VerdictError {
    StorageError::LockPoisoned {
        details: e.to_string(),
    }
    .into()
}

impl MeshTransport for InMemoryTransport {
    fn fetch(&self) -> VerdictResult<Option<MeshState>> {
        Ok(self.remote.lock().map_err(poisoned)?.clone())
    }

    fn publish(&self, state: &MeshState) -> VerdictResult<()> {
        *self.remote.lock().map_err(poisoned)? = Some(state.clone());
        self.published.lock().map_err(poisoned)?.push(state.clone());
        Ok(())
    }
}
