//! # verdict-engine
//!
//! Wires the subsystems into per-run operations.
//!
//! | Operation | Locking |
//! |-----------|---------|
//! | [`ReviewEngine::assess`] | Pending rewards applied under the weight lock; append under the record lock |
//! | [`ReviewEngine::reconcile`] | Outcome under the record lock, tuning under the weight lock |
//! | [`ReviewEngine::refit_trend_model`] | Snapshot read without locks; priors committed under the weight lock |
//! | [`ReviewEngine::sync_mesh`] | Remote fetched with no lock held; merged state committed under the mesh lock |
//!
//! `assess` never fails: every recoverable error becomes a [`Degradation`]
//! on the returned [`RunSummary`].
//!
//! [`Degradation`]: verdict_core::Degradation

pub mod engine;
pub mod review;
pub mod tracing_setup;

pub use engine::ReviewEngine;
pub use review::{RawReview, ReconcileStatus, RunSummary};
pub use tracing_setup::init_tracing;
