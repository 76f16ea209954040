//! Outcome taxonomy, tallying, and the periodic aggregator.
mod collector;
mod types;


pub use collector::{REPORT_PERIOD, drain_available, setup_tally_collector};
pub use types::{Bucket, FailureKind, Outcome, StatusTally, TallyReport};
