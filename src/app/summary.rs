use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use chopper::{
    args::OutputFormat,
    error::AppResult,
    runner::RunReport,
};

const MILLIS_PER_SECOND: f64 = 1_000.0;

/// Renders the final summary in the requested format.
///
/// # Errors
///
/// Returns an error when the JSON document cannot be serialized.
pub(crate) fn render_summary(
    report: &RunReport,
    format: OutputFormat,
    started_at: DateTime<Utc>,
) -> AppResult<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report, started_at),
    }
}

pub(crate) fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    let Some(aggregate) = report.aggregate.as_ref() else {
        out.push_str("No requests completed.\n");
        write_run_shape(&mut out, report);
        return out;
    };

    drop(writeln!(
        out,
        "Total requests completed: {}",
        aggregate.total_requests
    ));
    drop(writeln!(
        out,
        "Requests per second: {:.2}",
        aggregate.rounded_requests_per_second()
    ));
    drop(writeln!(out, "Fastest Request Time: {:?}", aggregate.fastest));
    drop(writeln!(out, "Slowest Request Time: {:?}", aggregate.slowest));
    drop(writeln!(out, "Average Request Time: {:?}", aggregate.average));
    drop(writeln!(out, "Status codes:"));
    for (status, count) in &aggregate.status_counts {
        drop(writeln!(out, "  {}: {}", status, count));
    }
    write_run_shape(&mut out, report);
    out
}

fn write_run_shape(out: &mut String, report: &RunReport) {
    drop(writeln!(out, "Concurrency: {}", report.concurrency));
    drop(writeln!(out, "Dropped requests: {}", report.dropped_requests));
}

#[derive(Debug, Serialize)]
struct JsonSummary {
    started_at: String,
    duration_ms: u64,
    elapsed_ms: u64,
    concurrency: usize,
    total_requests: u64,
    dropped_requests: u64,
    requests_per_second: f64,
    fastest_ms: Option<f64>,
    slowest_ms: Option<f64>,
    average_ms: Option<f64>,
    status_counts: BTreeMap<u16, u64>,
}

pub(crate) fn render_json(report: &RunReport, started_at: DateTime<Utc>) -> AppResult<String> {
    let aggregate = report.aggregate.as_ref();
    let summary = JsonSummary {
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        duration_ms: whole_millis(report.configured_duration),
        elapsed_ms: whole_millis(report.elapsed),
        concurrency: report.concurrency,
        total_requests: report.total_requests(),
        dropped_requests: report.dropped_requests,
        requests_per_second: aggregate.map_or(0.0, |value| value.rounded_requests_per_second()),
        fastest_ms: aggregate.map(|value| fractional_millis(value.fastest)),
        slowest_ms: aggregate.map(|value| fractional_millis(value.slowest)),
        average_ms: aggregate.map(|value| fractional_millis(value.average)),
        status_counts: aggregate
            .map(|value| value.status_counts.clone())
            .unwrap_or_default(),
    };
    let mut rendered = serde_json::to_string_pretty(&summary)?;
    rendered.push('\n');
    Ok(rendered)
}

fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn fractional_millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * MILLIS_PER_SECOND
}
