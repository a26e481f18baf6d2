use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use super::*;

fn outcome_ms(status_code: u16, millis: u64) -> RequestOutcome {
    RequestOutcome::new(status_code, Duration::from_millis(millis))
}

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

#[test]
fn aggregate_of_empty_set_is_no_data() -> Result<(), String> {
    let collector = ResultCollector::new();
    if collector.aggregate(Duration::from_secs(1)).is_some() {
        return Err("Expected no aggregate for an empty outcome set".to_owned());
    }
    if collector.aggregate(Duration::ZERO).is_some() {
        return Err("Expected no aggregate for an empty set with zero duration".to_owned());
    }
    Ok(())
}

#[test]
fn aggregate_reports_extremes_average_and_rate() -> Result<(), String> {
    let mut collector = ResultCollector::new();
    for (status, millis) in [(200, 30), (200, 10), (404, 20), (200, 40)] {
        collector.observe(outcome_ms(status, millis));
    }

    let aggregate = collector
        .aggregate(Duration::from_secs(2))
        .ok_or_else(|| "Expected aggregate".to_owned())?;

    if aggregate.total_requests != 4 {
        return Err(format!("Unexpected total: {}", aggregate.total_requests));
    }
    if aggregate.fastest != Duration::from_millis(10) {
        return Err(format!("Unexpected fastest: {:?}", aggregate.fastest));
    }
    if aggregate.slowest != Duration::from_millis(40) {
        return Err(format!("Unexpected slowest: {:?}", aggregate.slowest));
    }
    if aggregate.average != Duration::from_millis(25) {
        return Err(format!("Unexpected average: {:?}", aggregate.average));
    }
    if aggregate.requests_per_second.to_bits() != 2.0_f64.to_bits() {
        return Err(format!("Unexpected rps: {}", aggregate.requests_per_second));
    }
    if aggregate.status_counts.get(&200) != Some(&3) || aggregate.status_counts.get(&404) != Some(&1)
    {
        return Err(format!("Unexpected status counts: {:?}", aggregate.status_counts));
    }
    Ok(())
}

#[test]
fn aggregate_bounds_hold_for_every_outcome() -> Result<(), String> {
    let mut collector = ResultCollector::new();
    for micros in [917_u64, 3, 52_001, 77, 77, 1_000_003, 12] {
        collector.observe(RequestOutcome::new(200, Duration::from_micros(micros)));
    }
    let aggregate = collector
        .aggregate(Duration::from_millis(200))
        .ok_or_else(|| "Expected aggregate".to_owned())?;

    if !(aggregate.fastest <= aggregate.average && aggregate.average <= aggregate.slowest) {
        return Err(format!(
            "Expected fastest <= average <= slowest, got {:?} / {:?} / {:?}",
            aggregate.fastest, aggregate.average, aggregate.slowest
        ));
    }
    for outcome in collector.outcomes() {
        if outcome.response_time < aggregate.fastest || outcome.response_time > aggregate.slowest
        {
            return Err(format!("Outcome {:?} outside bounds", outcome.response_time));
        }
    }
    Ok(())
}

#[test]
fn aggregate_average_floors_to_nanoseconds() -> Result<(), String> {
    let outcomes = [
        RequestOutcome::new(200, Duration::from_nanos(1)),
        RequestOutcome::new(200, Duration::from_nanos(2)),
    ];
    let aggregate = Aggregate::compute(&outcomes, Duration::from_secs(1))
        .ok_or_else(|| "Expected aggregate".to_owned())?;
    if aggregate.average != Duration::from_nanos(1) {
        return Err(format!("Unexpected average: {:?}", aggregate.average));
    }
    Ok(())
}

#[test]
fn aggregate_rate_uses_configured_duration() -> Result<(), String> {
    let outcomes: Vec<RequestOutcome> = (0..7).map(|_| outcome_ms(200, 5)).collect();
    let duration = Duration::from_millis(200);
    let aggregate = Aggregate::compute(&outcomes, duration)
        .ok_or_else(|| "Expected aggregate".to_owned())?;
    let expected = 7.0_f64 / duration.as_secs_f64();
    if aggregate.requests_per_second.to_bits() != expected.to_bits() {
        return Err(format!(
            "Expected {} rps, got {}",
            expected, aggregate.requests_per_second
        ));
    }
    Ok(())
}

#[test]
fn aggregate_rate_with_zero_duration_is_zero() -> Result<(), String> {
    let outcomes = [outcome_ms(200, 5)];
    let aggregate = Aggregate::compute(&outcomes, Duration::ZERO)
        .ok_or_else(|| "Expected aggregate".to_owned())?;
    if aggregate.requests_per_second.to_bits() != 0.0_f64.to_bits() {
        return Err(format!("Unexpected rps: {}", aggregate.requests_per_second));
    }
    Ok(())
}

#[test]
fn rounded_rate_keeps_two_decimals() -> Result<(), String> {
    let outcomes: Vec<RequestOutcome> = (0..10).map(|_| outcome_ms(200, 1)).collect();
    let aggregate = Aggregate::compute(&outcomes, Duration::from_secs(3))
        .ok_or_else(|| "Expected aggregate".to_owned())?;
    if aggregate.rounded_requests_per_second().to_bits() != 3.33_f64.to_bits() {
        return Err(format!(
            "Unexpected rounded rps: {}",
            aggregate.rounded_requests_per_second()
        ));
    }
    if aggregate.requests_per_second.to_bits() == 3.33_f64.to_bits() {
        return Err("Full-precision rate must not be rounded".to_owned());
    }
    Ok(())
}

#[test]
fn aggregate_is_idempotent() -> Result<(), String> {
    let mut collector = ResultCollector::new();
    for millis in [3, 1, 4, 1, 5, 9, 2, 6] {
        collector.observe(outcome_ms(200, millis));
    }
    let duration = Duration::from_millis(1_500);
    let first = collector
        .aggregate(duration)
        .ok_or_else(|| "Expected aggregate".to_owned())?;
    let second = collector
        .aggregate(duration)
        .ok_or_else(|| "Expected aggregate".to_owned())?;
    if first != second
        || first.requests_per_second.to_bits() != second.requests_per_second.to_bits()
    {
        return Err(format!("Aggregates differ: {:?} vs {:?}", first, second));
    }
    Ok(())
}

#[test]
fn aggregate_ignores_insertion_order() -> Result<(), String> {
    let forward: Vec<RequestOutcome> = [8, 2, 5, 13].iter().map(|ms| outcome_ms(200, *ms)).collect();
    let mut reversed = forward.clone();
    reversed.reverse();
    let duration = Duration::from_secs(1);
    if Aggregate::compute(&forward, duration) != Aggregate::compute(&reversed, duration) {
        return Err("Aggregate depends on insertion order".to_owned());
    }
    Ok(())
}

#[test]
fn outcomes_carry_the_fixed_expected_status() -> Result<(), String> {
    let outcome = outcome_ms(503, 1);
    if outcome.expected_status_code != EXPECTED_STATUS_CODE || EXPECTED_STATUS_CODE != 200 {
        return Err(format!("Unexpected expected status: {}", outcome.expected_status_code));
    }
    Ok(())
}

#[test]
fn collector_task_drains_after_all_senders_drop() -> Result<(), String> {
    run_async_test(async {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let handle = setup_result_collector(outcome_rx);

        let mut producers = Vec::new();
        for worker in 0..4_u64 {
            let outcome_tx = outcome_tx.clone();
            producers.push(tokio::spawn(async move {
                for seq in 0..25_u64 {
                    let millis = worker.saturating_mul(100).saturating_add(seq);
                    if outcome_tx.send(outcome_ms(200, millis)).is_err() {
                        return;
                    }
                }
            }));
        }
        drop(outcome_tx);
        for producer in producers {
            producer
                .await
                .map_err(|err| format!("producer join failed: {}", err))?;
        }

        let collector = handle
            .await
            .map_err(|err| format!("collector join failed: {}", err))?;
        if collector.len() != 100 {
            return Err(format!("Expected 100 outcomes, got {}", collector.len()));
        }
        Ok(())
    })
}
