//! # verdict-scoring
//!
//! Pure, stateless scoring: raw per-PR facts → bounded [`SignalVector`] →
//! (confidence, risk). Nothing here touches shared state, so concurrent
//! reviews need no synchronization.
//!
//! [`SignalVector`]: verdict_core::SignalVector

pub mod builder;
pub mod scorer;

pub use builder::{normalize_category, BuiltSignals, RawSignals, SignalBuilder};
pub use scorer::{Assessment, Scorer};
