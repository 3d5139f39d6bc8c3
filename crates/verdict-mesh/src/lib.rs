//! # verdict-mesh
//!
//! Shares learning across repositories without coordination.
//!
//! Each repository contributes a [`RepoSnapshot`] (weights, logical clock,
//! sample count, category tallies). A [`MeshState`] keeps the newest snapshot
//! per repository; merging two states is a per-repository "higher clock wins",
//! so merge is commutative, associative, and idempotent. Shared weights and
//! category statistics are derived from the members, never stored.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use verdict_core::WeightVector;
//! use verdict_mesh::{merge, MeshState, RepoSnapshot};
//!
//! let a = MeshState::from_snapshot(RepoSnapshot::new("a", WeightVector::uniform(), 3, 10, BTreeMap::new()));
//! let b = MeshState::from_snapshot(RepoSnapshot::new("b", WeightVector::uniform(), 1, 30, BTreeMap::new()));
//! assert_eq!(merge(&a, &b).shared_weights(), merge(&b, &a).shared_weights());
//! ```

pub mod snapshot;
pub mod state;
pub mod transport;

pub use snapshot::RepoSnapshot;
pub use state::{merge, MeshState};
pub use transport::{FileTransport, InMemoryTransport, MeshTransport};
