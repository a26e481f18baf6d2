//! Outcome collection and aggregate statistics.
mod collector;
mod types;

#[cfg(test)]
mod tests;

pub use collector::{ResultCollector, setup_result_collector};
pub use types::{Aggregate, EXPECTED_STATUS_CODE, RequestOutcome};
