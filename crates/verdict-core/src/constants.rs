/// Current on-disk schema version of the review memory database.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of signals in the fixed schema.
pub const SIGNAL_COUNT: usize = 4;

/// Upper bound of the tuner learning rate. A single outcome can move a
/// weight by at most this fraction of its distance to the target.
pub const MAX_LEARNING_RATE: f64 = 0.3;

/// Tolerance used when checking that a weight vector sums to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Mean-risk difference (score points) inside which a category trend is stable.
pub const TREND_DEAD_BAND: f64 = 2.0;

/// Number of most recent records that shape the review posture.
pub const POSTURE_WINDOW: usize = 10;

/// Neutral value used for every signal before any history exists.
pub const NEUTRAL_SIGNAL: f64 = 0.5;

/// Upper bound of confidence and risk scores.
pub const SCORE_SCALE: f64 = 100.0;
