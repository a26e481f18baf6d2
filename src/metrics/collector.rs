use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use super::{Aggregate, RequestOutcome};

/// Owns every outcome observed during a run.
///
/// Only the collector task writes to it; workers publish through the
/// outcome conduit and never see the stored set.
#[derive(Debug, Default)]
pub struct ResultCollector {
    outcomes: Vec<RequestOutcome>,
}

impl ResultCollector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }

    pub fn observe(&mut self, outcome: RequestOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub fn outcomes(&self) -> &[RequestOutcome] {
        &self.outcomes
    }

    /// Statistics over the outcomes seen so far, or `None` when there are none.
    #[must_use]
    pub fn aggregate(&self, run_duration: Duration) -> Option<Aggregate> {
        Aggregate::compute(&self.outcomes, run_duration)
    }
}

/// Spawns the single consumer of the outcome conduit.
///
/// The task finishes once every sender has been dropped and all buffered
/// outcomes have been drained, then hands back the filled collector.
#[must_use]
pub fn setup_result_collector(
    mut outcome_rx: mpsc::UnboundedReceiver<RequestOutcome>,
) -> JoinHandle<ResultCollector> {
    tokio::spawn(async move {
        let mut collector = ResultCollector::new();
        while let Some(outcome) = outcome_rx.recv().await {
            collector.observe(outcome);
        }
        debug!("Outcome conduit drained after {} outcomes.", collector.len());
        collector
    })
}
