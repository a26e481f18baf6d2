use std::collections::BTreeMap;
use std::time::Duration;

/// Baseline status recorded on every outcome. It is informational only and
/// is never compared against the observed status.
pub const EXPECTED_STATUS_CODE: u16 = 200;

/// Scale used to round requests per second to two decimals.
const RPS_DISPLAY_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    /// Status of the final response in the redirect chain.
    pub status_code: u16,
    pub expected_status_code: u16,
    pub response_time: Duration,
}

impl RequestOutcome {
    #[must_use]
    pub const fn new(status_code: u16, response_time: Duration) -> Self {
        Self {
            status_code,
            expected_status_code: EXPECTED_STATUS_CODE,
            response_time,
        }
    }
}

/// Summary statistics over a non-empty outcome set.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub total_requests: u64,
    pub fastest: Duration,
    pub slowest: Duration,
    pub average: Duration,
    /// Outcomes divided by the configured run duration, full precision.
    pub requests_per_second: f64,
    pub status_counts: BTreeMap<u16, u64>,
}

impl Aggregate {
    /// Computes statistics over `outcomes`.
    ///
    /// Returns `None` for an empty set; there is nothing to average and no
    /// extreme to report. A zero `run_duration` yields `0.0` requests per
    /// second instead of an infinite rate.
    #[must_use]
    pub fn compute(outcomes: &[RequestOutcome], run_duration: Duration) -> Option<Self> {
        let first = outcomes.first()?;

        let mut fastest = first.response_time;
        let mut slowest = first.response_time;
        let mut total_nanos: u128 = 0;
        let mut status_counts: BTreeMap<u16, u64> = BTreeMap::new();

        for outcome in outcomes {
            fastest = fastest.min(outcome.response_time);
            slowest = slowest.max(outcome.response_time);
            total_nanos = total_nanos.saturating_add(outcome.response_time.as_nanos());
            let count = status_counts.entry(outcome.status_code).or_insert(0);
            *count = count.saturating_add(1);
        }

        let total_requests = u64::try_from(outcomes.len()).unwrap_or(u64::MAX);
        let average_nanos = total_nanos
            .checked_div(u128::from(total_requests))
            .unwrap_or(0);
        let average = Duration::from_nanos(u64::try_from(average_nanos).unwrap_or(u64::MAX));

        Some(Self {
            total_requests,
            fastest,
            slowest,
            average,
            requests_per_second: requests_per_second(total_requests, run_duration),
            status_counts,
        })
    }

    /// Requests per second rounded to two decimals for display.
    #[must_use]
    pub fn rounded_requests_per_second(&self) -> f64 {
        (self.requests_per_second * RPS_DISPLAY_SCALE).round() / RPS_DISPLAY_SCALE
    }
}

fn requests_per_second(total_requests: u64, run_duration: Duration) -> f64 {
    let secs = run_duration.as_secs_f64();
    if secs > 0.0 {
        total_requests as f64 / secs
    } else {
        0.0
    }
}
