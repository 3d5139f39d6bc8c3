mod category_stats;
mod degradation;
mod outcome;
mod review_record;
mod weight_state;

pub use category_stats::{CategoryStats, CategoryTally, Trend};
pub use degradation::Degradation;
pub use outcome::{Outcome, Reward};
pub use review_record::{RecordId, ReviewRecord};
pub use weight_state::{CategoryPrior, PriorSnapshot, WeightState};
