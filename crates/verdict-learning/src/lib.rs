//! # verdict-learning
//!
//! Turns outcomes into weight updates.
//!
//! - [`derive_reward`]: how close a past confidence came to the observed outcome.
//! - [`AdaptiveTuner`]: bounded exponential update of the weight vector.
//! - [`Calibration`]: consistency summary of recent confidence scores.

pub mod calibration;
pub mod reward;
pub mod tuner;

pub use calibration::Calibration;
pub use reward::derive_reward;
pub use tuner::AdaptiveTuner;
