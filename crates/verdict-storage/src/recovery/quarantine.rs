//! Move a corrupt store aside so a fresh segment can take its place.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use verdict_core::errors::{StorageError, VerdictResult};

use super::integrity_check::check_integrity;

/// SQLite sidecar files that travel with the main database file.
const SIDECARS: [&str; 2] = ["-wal", "-shm"];

/// If the store at `path` is corrupt, rename it (and its WAL sidecars) to
/// `<name>.corrupt-<unix-seconds>` and return the new location.
pub fn quarantine_if_corrupt(path: &Path) -> VerdictResult<Option<PathBuf>> {
    if check_integrity(path)? {
        return Ok(None);
    }
    let target = quarantine_path(path);
    rename(path, &target)?;
    for suffix in SIDECARS {
        let sidecar = with_suffix(path, suffix);
        if sidecar.exists() {
            rename(&sidecar, &with_suffix(&target, suffix))?;
        }
    }
    warn!(
        store = %path.display(),
        quarantined = %target.display(),
        "review memory corrupt; starting a fresh store"
    );
    Ok(Some(target))
}

fn quarantine_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().timestamp();
    let mut candidate = with_suffix(path, &format!(".corrupt-{stamp}"));
    let mut n = 1;
    while candidate.exists() {
        candidate = with_suffix(path, &format!(".corrupt-{stamp}-{n}"));
        n += 1;
    }
    candidate
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn rename(from: &Path, to: &Path) -> VerdictResult<()> {
    std::fs::rename(from, to).map_err(|e| {
        StorageError::QuarantineFailed {
            path: from.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
