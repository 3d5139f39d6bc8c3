//! One repository's contribution to the mesh.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use verdict_core::{CategoryTally, WeightVector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSnapshot {
    pub repository_id: String,
    pub weights: WeightVector,
    /// Logical clock of the repository's local weight updates.
    pub clock: u64,
    /// Review history backing the weights; the averaging weight in the mesh.
    pub sample_count: u64,
    pub categories: BTreeMap<String, CategoryTally>,
}

impl RepoSnapshot {
    pub fn new(
        repository_id: impl Into<String>,
        weights: WeightVector,
        clock: u64,
        sample_count: u64,
        categories: BTreeMap<String, CategoryTally>,
    ) -> Self {
        Self {
            repository_id: repository_id.into(),
            weights,
            clock,
            sample_count,
            categories,
        }
    }

    /// Total order used to pick the surviving snapshot of one repository:
    /// clock, then sample count, then content digest. Equal only for
    /// identical snapshots.
    pub fn precedence(&self, other: &Self) -> Ordering {
        self.clock
            .cmp(&other.clock)
            .then(self.sample_count.cmp(&other.sample_count))
            .then_with(|| self.content_digest().cmp(&other.content_digest()))
    }

    /// blake3 of the canonical JSON form.
    pub fn content_digest(&self) -> [u8; 32] {
        // Field order is fixed and maps are ordered, so the encoding is canonical.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        *blake3::hash(&bytes).as_bytes()
    }
}
