//! Call plan types
//!
//! A `CallPlan` is the immutable description of one worker's campaign: which
//! endpoint to call, how many times, how long to wait between calls, and
//! what behavior the endpoint is expected to show.

use serde::Serialize;
use std::time::Duration;

/// One of the simulated service's routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    /// Always answers 200 "OK"
    Health,
    /// Always answers 500
    Error,
    /// Answers 500 with a fixed probability
    RandomError,
    /// Answers 200 after a fixed delay
    Slow,
}

impl Endpoint {
    /// All endpoints, in route registration order
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Health,
        Endpoint::Error,
        Endpoint::RandomError,
        Endpoint::Slow,
    ];

    /// Short name used in logs and the plan registry
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Health => "health",
            Endpoint::Error => "error",
            Endpoint::RandomError => "random-error",
            Endpoint::Slow => "slow",
        }
    }

    /// HTTP path of the route
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Health => "/api/health",
            Endpoint::Error => "/api/error",
            Endpoint::RandomError => "/api/random-error",
            Endpoint::Slow => "/api/slow",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Behavior class a plan expects from its endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Behavior {
    AlwaysSuccess,
    AlwaysFailure,
    Probabilistic { failure_probability: f64 },
    FixedLatency { latency: Duration },
}

impl Behavior {
    /// Whether an error status is a legitimate outcome for this behavior
    pub fn expects_failure(&self) -> bool {
        matches!(
            self,
            Behavior::AlwaysFailure | Behavior::Probabilistic { .. }
        )
    }
}

/// Immutable description of one worker's campaign
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallPlan {
    endpoint: Endpoint,
    iterations: u32,
    inter_call_delay: Duration,
    behavior: Behavior,
}

impl CallPlan {
    /// Create a new call plan
    pub fn new(
        endpoint: Endpoint,
        iterations: u32,
        inter_call_delay: Duration,
        behavior: Behavior,
    ) -> Self {
        Self {
            endpoint,
            iterations,
            inter_call_delay,
            behavior,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn inter_call_delay(&self) -> Duration {
        self.inter_call_delay
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    /// Lower bound on how long the plan takes when nothing is cancelled
    ///
    /// Counts the waits between calls plus any latency the behavior promises
    /// for each call.
    pub fn minimum_duration(&self) -> Duration {
        let per_call = match self.behavior {
            Behavior::FixedLatency { latency } => latency,
            _ => Duration::ZERO,
        };
        let gaps = self.iterations.saturating_sub(1);
        per_call * self.iterations + self.inter_call_delay * gaps
    }
}
