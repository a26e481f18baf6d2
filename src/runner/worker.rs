use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tracing::debug;

use crate::{
    http::RequestExecutor,
    metrics::RequestOutcome,
    shutdown::{ShutdownReceiver, stop_requested},
};

/// Incremental signal for display purposes; nothing in a run waits on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub worker: usize,
    /// Outcomes this worker has published so far.
    pub completed: u64,
    /// Time since the run started.
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct WorkerSummary {
    pub(super) completed: u64,
    pub(super) dropped: u64,
}

pub(super) struct Worker {
    pub(super) id: usize,
    pub(super) executor: RequestExecutor,
    pub(super) shutdown_rx: ShutdownReceiver,
    pub(super) outcome_tx: mpsc::UnboundedSender<RequestOutcome>,
    pub(super) progress_tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
    pub(super) run_start: Instant,
}

impl Worker {
    pub(super) fn spawn(self) -> JoinHandle<WorkerSummary> {
        tokio::spawn(self.run())
    }

    /// Executes logical requests back to back until the stop signal is seen.
    ///
    /// The signal is only checked between iterations, so an in-flight
    /// request always runs to completion.
    async fn run(mut self) -> WorkerSummary {
        let mut summary = WorkerSummary::default();

        while !stop_requested(&mut self.shutdown_rx) {
            let Some(outcome) = self.executor.execute_once().await else {
                summary.dropped = summary.dropped.saturating_add(1);
                // Failed attempts can resolve without suspending; let the timer run.
                tokio::task::yield_now().await;
                continue;
            };

            if self.outcome_tx.send(outcome).is_err() {
                debug!("Worker {}: outcome conduit closed.", self.id);
                break;
            }
            summary.completed = summary.completed.saturating_add(1);

            if let Some(progress_tx) = self.progress_tx.as_ref() {
                drop(progress_tx.send(ProgressEvent {
                    worker: self.id,
                    completed: summary.completed,
                    elapsed: self.run_start.elapsed(),
                }));
            }
        }

        debug!(
            "Worker {} stopped: {} outcomes, {} dropped requests.",
            self.id, summary.completed, summary.dropped
        );
        summary
    }
}
