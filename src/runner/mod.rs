//! Duration-bounded worker pool and run lifecycle.
mod config;
mod worker;


use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    http::{RequestExecutor, build_client, new_cookie_jar},
    metrics::{Aggregate, setup_result_collector},
    shutdown::{ShutdownReceiver, ShutdownSender, shutdown_channel},
};

pub use config::{RunConfig, parse_target_url};
pub use worker::ProgressEvent;

use worker::Worker;

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub configured_duration: Duration,
    pub elapsed: Duration,
    pub concurrency: usize,
    /// Logical requests that ended without an outcome.
    pub dropped_requests: u64,
    /// `None` when no request produced an outcome.
    pub aggregate: Option<Aggregate>,
}

impl RunReport {
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.aggregate
            .as_ref()
            .map_or(0, |aggregate| aggregate.total_requests)
    }
}

/// Drives one run: workers, duration timer, drain and aggregation.
pub struct RunController<'cfg> {
    config: &'cfg RunConfig,
    shutdown_tx: ShutdownSender,
    shutdown_rx: ShutdownReceiver,
    progress_tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl<'cfg> RunController<'cfg> {
    #[must_use]
    pub fn new(config: &'cfg RunConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        Self {
            config,
            shutdown_tx,
            shutdown_rx,
            progress_tx: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress_tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    /// Sender that stops the run early, honoured between iterations just
    /// like the duration timer.
    #[must_use]
    pub fn shutdown_sender(&self) -> ShutdownSender {
        self.shutdown_tx.clone()
    }

    /// Runs the benchmark to completion.
    ///
    /// Per-request failures never surface here; they only lower the outcome
    /// count.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport or request template cannot be
    /// built (before any request is sent), or when a worker or the collector
    /// task panics.
    pub async fn run(mut self) -> AppResult<RunReport> {
        let config = self.config;
        let executors = build_executors(config)?;
        let concurrency = executors.len();

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let collector_handle = setup_result_collector(outcome_rx);

        let worker_receivers: Vec<ShutdownReceiver> = executors
            .iter()
            .map(|_| self.shutdown_tx.subscribe())
            .collect();
        if config.duration.is_zero() {
            // No time budget: raise the stop signal before any worker starts.
            drop(self.shutdown_tx.send(()));
        }

        info!(
            "Starting run against {} with {} workers for {:?}.",
            config.url, concurrency, config.duration
        );
        let run_start = Instant::now();
        let worker_handles: Vec<_> = executors
            .into_iter()
            .zip(worker_receivers)
            .enumerate()
            .map(|(id, (executor, shutdown_rx))| {
                Worker {
                    id,
                    executor,
                    shutdown_rx,
                    outcome_tx: outcome_tx.clone(),
                    progress_tx: self.progress_tx.clone(),
                    run_start,
                }
                .spawn()
            })
            .collect();
        // Workers hold the only producers; the conduit closes when the last one exits.
        drop(outcome_tx);
        drop(self.progress_tx.take());

        tokio::select! {
            () = sleep(config.duration) => {
                debug!("Run duration elapsed.");
            }
            _ = self.shutdown_rx.recv() => {
                info!("Stop requested before the run duration elapsed.");
            }
        }
        // Sent unconditionally so workers that subscribed after an early stop still see one.
        drop(self.shutdown_tx.send(()));

        let mut dropped_requests: u64 = 0;
        let mut join_error: Option<AppError> = None;
        for handle in worker_handles {
            match handle.await {
                Ok(summary) => {
                    dropped_requests = dropped_requests.saturating_add(summary.dropped);
                }
                Err(err) => {
                    if join_error.is_none() {
                        join_error = Some(AppError::from(err));
                    }
                }
            }
        }
        debug!("All workers stopped after {:?}.", run_start.elapsed());

        let collector = collector_handle.await?;
        if let Some(err) = join_error {
            return Err(err);
        }

        let elapsed = run_start.elapsed();
        let aggregate = collector.aggregate(config.duration);
        info!(
            "Run finished in {:?}: {} outcomes, {} dropped requests.",
            elapsed,
            collector.len(),
            dropped_requests
        );

        Ok(RunReport {
            configured_duration: config.duration,
            elapsed,
            concurrency,
            dropped_requests,
            aggregate,
        })
    }
}

/// Runs a benchmark with no progress hook or external stop.
///
/// # Errors
///
/// See [`RunController::run`].
pub async fn run(config: &RunConfig) -> AppResult<RunReport> {
    RunController::new(config).run().await
}

/// One executor per worker. Without cookies every worker shares a pooled
/// client; with cookies each worker gets a client around its own jar.
fn build_executors(config: &RunConfig) -> AppResult<Vec<RequestExecutor>> {
    let template = config.request_template()?;
    let settings = config.client_settings();
    let policy = config.redirect_policy();
    let shared_client = if config.use_cookie_jar {
        None
    } else {
        Some(build_client(&settings, None)?)
    };

    (0..config.concurrency.get())
        .map(|_| {
            let client = match shared_client.as_ref() {
                Some(client) => client.clone(),
                None => build_client(&settings, Some(new_cookie_jar()))?,
            };
            Ok(RequestExecutor::new(client, template.clone(), policy))
        })
        .collect()
}
