//! # verdict-prediction
//!
//! Explainable baselines fitted from the review memory.
//!
//! | Piece | Output |
//! |-------|--------|
//! | [`TrendModel`] | Mean signal vector per category; the fallback for missing signals |
//! | [`ReviewPosture`] | Tone and depth suggested by recent risk |

pub mod posture;
pub mod trend;

pub use posture::{ReviewPosture, Tone};
pub use trend::TrendModel;
