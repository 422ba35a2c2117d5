//! Probe worker
//!
//! Drives one [`CallPlan`] to completion: sequential, timed calls against a
//! single endpoint.
//!
//! ## Loop
//!
//! For each iteration the worker issues one call, logs the outcome, and
//! waits the plan's inter-call delay before the next one. No trailing wait
//! follows the last call.
//!
//! ## Failure containment
//!
//! Error statuses and transport failures are logged at the call site and
//! never end the loop. Each attempt is made exactly once.
//!
//! ## Cancellation
//!
//! Cooperative: the token is observed only at iteration boundaries and
//! during the inter-call wait, never while a call is in flight.

use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::{CallOutcome, CallStatus, Probe};
use crate::plans::{CallPlan, Endpoint};

/// Tally of one worker's run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub endpoint: Endpoint,
    /// Calls issued
    pub attempted: u32,
    /// Calls answered with a 2xx status
    pub succeeded: u32,
    /// Calls answered with a non-2xx status
    pub error_responses: u32,
    /// Calls that produced no response
    pub transport_errors: u32,
    /// Whether the loop stopped early because of cancellation
    pub cancelled: bool,
}

impl WorkerReport {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            attempted: 0,
            succeeded: 0,
            error_responses: 0,
            transport_errors: 0,
            cancelled: false,
        }
    }

    fn record(&mut self, outcome: &CallOutcome) {
        self.attempted += 1;
        match &outcome.status {
            status if status.is_success() => self.succeeded += 1,
            CallStatus::Response { .. } => self.error_responses += 1,
            CallStatus::Transport { .. } => self.transport_errors += 1,
        }
    }

    /// Calls that did not succeed, for any reason
    pub fn failed(&self) -> u32 {
        self.error_responses + self.transport_errors
    }
}

/// Executes one call plan
pub struct ProbeWorker {
    plan: CallPlan,
    probe: Arc<dyn Probe>,
    cancel: CancellationToken,
}

impl ProbeWorker {
    pub fn new(plan: CallPlan, probe: Arc<dyn Probe>, cancel: CancellationToken) -> Self {
        Self {
            plan,
            probe,
            cancel,
        }
    }

    /// Run the plan to completion or until cancelled
    pub async fn run(self) -> WorkerReport {
        let endpoint = self.plan.endpoint();
        let iterations = self.plan.iterations();
        let mut report = WorkerReport::new(endpoint);

        info!(
            endpoint = %endpoint,
            iterations,
            delay_ms = self.plan.inter_call_delay().as_millis() as u64,
            min_duration_ms = self.plan.minimum_duration().as_millis() as u64,
            "Starting probe worker"
        );

        for iteration in 0..iterations {
            let proceed = if iteration == 0 {
                !self.cancel.is_cancelled()
            } else {
                self.pause().await
            };

            if !proceed {
                info!(
                    endpoint = %endpoint,
                    completed = report.attempted,
                    remaining = iterations - iteration,
                    "Probe worker cancelled"
                );
                report.cancelled = true;
                break;
            }

            let start = Instant::now();
            let status = self.probe.call(endpoint).await;
            let outcome = CallOutcome {
                endpoint,
                iteration,
                latency: start.elapsed(),
                status,
            };

            self.log_outcome(&outcome);
            report.record(&outcome);
        }

        info!(
            endpoint = %endpoint,
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed(),
            cancelled = report.cancelled,
            "Probe worker finished"
        );

        report
    }

    /// Wait the inter-call delay, returning false if cancelled first
    async fn pause(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.plan.inter_call_delay()) => true,
        }
    }

    fn log_outcome(&self, outcome: &CallOutcome) {
        let call = outcome.iteration + 1;
        let latency_ms = outcome.latency.as_millis() as u64;

        match &outcome.status {
            CallStatus::Response { status, .. } if outcome.is_success() => {
                info!(endpoint = %outcome.endpoint, call, status, latency_ms, "API call succeeded");
            }
            CallStatus::Response { status, body } if self.plan.behavior().expects_failure() => {
                info!(
                    endpoint = %outcome.endpoint,
                    call,
                    status,
                    latency_ms,
                    "API call returned expected error response"
                );
                debug!(endpoint = %outcome.endpoint, call, body = %body, "Error response body");
            }
            CallStatus::Response { status, body } => {
                warn!(
                    endpoint = %outcome.endpoint,
                    call,
                    status,
                    latency_ms,
                    body = %body,
                    "API call returned unexpected error status"
                );
            }
            CallStatus::Transport { error } => {
                error!(
                    endpoint = %outcome.endpoint,
                    call,
                    latency_ms,
                    error = %error,
                    "API call failed"
                );
            }
        }
    }
}
