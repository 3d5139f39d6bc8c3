//! Merged mesh state and the merge function.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use verdict_core::constants::SIGNAL_COUNT;
use verdict_core::{CategoryStats, CategoryTally, WeightVector};

use crate::snapshot::RepoSnapshot;

/// The newest known snapshot of every repository in the mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshState {
    members: BTreeMap<String, RepoSnapshot>,
}

impl MeshState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: RepoSnapshot) -> Self {
        let mut state = Self::new();
        state.observe(snapshot);
        state
    }

    /// Fold one snapshot in; it replaces the stored one only if it takes precedence.
    pub fn observe(&mut self, snapshot: RepoSnapshot) {
        match self.members.get(&snapshot.repository_id) {
            Some(current) if current.precedence(&snapshot) != Ordering::Less => {}
            _ => {
                self.members.insert(snapshot.repository_id.clone(), snapshot);
            }
        }
    }

    /// `merge(self, other)`: per repository, the snapshot with precedence survives.
    pub fn merge(&self, other: &MeshState) -> MeshState {
        let mut merged = self.clone();
        for snapshot in other.members.values() {
            merged.observe(snapshot.clone());
        }
        debug!(
            members = merged.members.len(),
            samples = merged.total_samples(),
            "mesh states merged"
        );
        merged
    }

    pub fn member(&self, repository_id: &str) -> Option<&RepoSnapshot> {
        self.members.get(repository_id)
    }

    pub fn members(&self) -> impl Iterator<Item = &RepoSnapshot> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn total_samples(&self) -> u64 {
        self.members.values().map(|m| m.sample_count).sum()
    }

    /// Sample-count-weighted average of member weights, renormalized.
    ///
    /// Members with no samples count once each when no member has samples.
    /// An empty mesh shares uniform weights.
    pub fn shared_weights(&self) -> WeightVector {
        let total = self.total_samples();
        let mut sums = [0.0; SIGNAL_COUNT];
        for member in self.members.values() {
            let influence = if total == 0 { 1.0 } else { member.sample_count as f64 };
            for (sum, weight) in sums.iter_mut().zip(member.weights.values()) {
                *sum += influence * weight;
            }
        }
        WeightVector::normalized(sums)
    }

    /// Per-category tallies concatenated across members.
    pub fn category_tallies(&self) -> BTreeMap<String, CategoryTally> {
        let mut tallies: BTreeMap<String, CategoryTally> = BTreeMap::new();
        for member in self.members.values() {
            for (category, tally) in &member.categories {
                tallies.entry(category.clone()).or_default().absorb(tally);
            }
        }
        tallies
    }

    /// Aggregate statistics recomputed from the concatenated tallies.
    pub fn category_stats(&self) -> BTreeMap<String, CategoryStats> {
        self.category_tallies()
            .into_iter()
            .map(|(category, tally)| {
                let stats = CategoryStats::from_tally(category.clone(), &tally);
                (category, stats)
            })
            .collect()
    }

    /// Hex blake3 digest of the canonical JSON form; equal states hash equal.
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}

/// `merge(local, remote) -> merged`. Neither input is modified.
pub fn merge(local: &MeshState, remote: &MeshState) -> MeshState {
    local.merge(remote)
}
