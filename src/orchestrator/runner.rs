//! Traffic orchestrator
//!
//! Sequences a run end to end:
//!
//! ```text
//! NotStarted -> Warmup -> Dispatching -> AwaitingCompletion -> Completed | TimedOut
//! ```
//!
//! The orchestrator never fails. Worker panics and the completion deadline
//! are logged and folded into the returned [`RunSummary`].

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::state::{RunState, RunTracker};
use crate::client::{Probe, ProbeClient, ProbeError};
use crate::config::TargetConfig;
use crate::plans::{self, CallPlan};
use crate::worker::{ProbeWorker, WorkerReport};

/// Grace period before the first probe, while the service finishes starting
pub const WARMUP: Duration = Duration::from_secs(10);

/// Hard bound on waiting for workers once dispatched
pub const COMPLETION_DEADLINE: Duration = Duration::from_secs(5 * 60);

/// Maximum number of workers running at once
pub const POOL_SIZE: usize = 4;

/// Outcome of a traffic run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Terminal state the run ended in
    pub state: RunState,
    /// Reports of the workers that finished before the deadline
    pub reports: Vec<WorkerReport>,
    /// Wall time from the start of `run` to the terminal state
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn completed(&self) -> bool {
        self.state == RunState::Completed
    }

    /// Report for an endpoint, if its worker finished
    pub fn report(&self, endpoint: crate::plans::Endpoint) -> Option<&WorkerReport> {
        self.reports.iter().find(|r| r.endpoint == endpoint)
    }
}

/// Drives one traffic run against a resolved target
pub struct TrafficOrchestrator {
    target: TargetConfig,
    probe: Arc<dyn Probe>,
    plans: Vec<CallPlan>,
    cancel: CancellationToken,
    tracker: RunTracker,
}

impl TrafficOrchestrator {
    /// Create an orchestrator running the planned campaigns through `probe`
    pub fn new(target: TargetConfig, probe: Arc<dyn Probe>) -> Self {
        Self {
            target,
            probe,
            plans: plans::planned(),
            cancel: CancellationToken::new(),
            tracker: RunTracker::new(),
        }
    }

    /// Create an orchestrator calling the target over HTTP
    pub fn for_target(target: TargetConfig) -> Result<Self, ProbeError> {
        let client = ProbeClient::for_target(&target)?;
        Ok(Self::new(target, Arc::new(client)))
    }

    /// Replace the campaigns to run
    pub fn with_plans(mut self, plans: Vec<CallPlan>) -> Self {
        self.plans = plans;
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token workers observe at iteration boundaries
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shared view of the run's state
    pub fn tracker(&self) -> RunTracker {
        self.tracker.clone()
    }

    /// Run warmup, dispatch, and await to a terminal state
    pub async fn run(self) -> RunSummary {
        let Self {
            target,
            probe,
            plans,
            cancel,
            tracker,
        } = self;
        let started = Instant::now();

        info!(
            base_url = %target.base_url(),
            deployment = %target.deployment(),
            "Resolved traffic target"
        );

        tracker.advance(RunState::Warmup);
        info!(
            warmup_secs = WARMUP.as_secs(),
            "Waiting for server to fully start before sending traffic"
        );
        tokio::time::sleep(WARMUP).await;

        tracker.advance(RunState::Dispatching);
        tracker.set_workers_total(plans.len());
        info!(
            workers = plans.len(),
            pool_size = POOL_SIZE,
            plans = ?plans.iter().map(|p| p.endpoint().name()).collect::<Vec<_>>(),
            "Starting traffic"
        );

        let slots = Arc::new(Semaphore::new(POOL_SIZE));
        let mut join_set: JoinSet<WorkerReport> = JoinSet::new();

        for plan in plans {
            let worker = ProbeWorker::new(plan, Arc::clone(&probe), cancel.clone());
            let slots = Arc::clone(&slots);
            let tracker = tracker.clone();

            join_set.spawn(async move {
                // The semaphore is never closed, so acquiring only waits
                let _slot = slots.acquire_owned().await.ok();
                let report = worker.run().await;
                tracker.worker_finished();
                report
            });
        }

        tracker.advance(RunState::AwaitingCompletion);

        let mut reports = Vec::new();
        let drained = tokio::time::timeout(COMPLETION_DEADLINE, async {
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok(report) => reports.push(report),
                    Err(e) => error!(error = %e, "Probe worker task panicked"),
                }
            }
        })
        .await;

        let state = match drained {
            Ok(()) => {
                info!(workers = reports.len(), "All traffic calls completed");
                RunState::Completed
            }
            Err(_) => {
                let outstanding = join_set.len();
                // Detach rather than abort; in-flight calls run to completion on their own
                join_set.detach_all();
                warn!(
                    outstanding,
                    finished = reports.len(),
                    deadline_secs = COMPLETION_DEADLINE.as_secs(),
                    "Traffic run timed out, abandoning outstanding workers"
                );
                RunState::TimedOut
            }
        };

        tracker.advance(state);

        RunSummary {
            state,
            reports,
            elapsed: started.elapsed(),
        }
    }
}
